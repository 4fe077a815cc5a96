use comfy_table::presets::ASCII_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use speechscore::catalog::{SkillCatalog, SkillDefinition};
use speechscore::scorer::{Confidence, EvaluationScoreState, Resolution, ScoreSource};

fn confidence_cell(confidence: Confidence) -> Cell {
    match confidence {
        Confidence::Measured => Cell::new("measured"),
        Confidence::Estimated => Cell::new("ESTIMATED").fg(Color::Yellow),
    }
}

fn source_label(source: ScoreSource) -> &'static str {
    match source {
        ScoreSource::Snapshot => "snapshot",
        ScoreSource::SkillScores => "skill scores",
        ScoreSource::ManualBlob => "manual",
        ScoreSource::FinalScoreEstimate => "final score",
        ScoreSource::NoScoreData => "-",
    }
}

fn right_align(table: &mut Table, columns: std::ops::RangeInclusive<usize>) {
    for i in columns {
        if let Some(col) = table.column_mut(i) {
            col.set_cell_alignment(CellAlignment::Right);
        }
    }
}

pub fn categories(name: &str, state: &EvaluationScoreState) {
    println!("\nEvaluation: {}", name);
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("Category").add_attribute(Attribute::Bold),
        Cell::new("Count"),
        Cell::new("Points"),
        Cell::new("Max"),
        Cell::new("Raw %"),
        Cell::new("Score %").fg(Color::Cyan),
        Cell::new("Confidence"),
    ]);

    for summary in &state.categories {
        let score = if summary.is_scored() || summary.confidence == Confidence::Estimated {
            Cell::new(format!("{:.1}", summary.percentage)).fg(Color::Cyan)
        } else {
            Cell::new("-")
        };
        table.add_row(vec![
            Cell::new(summary.category.to_string()).add_attribute(Attribute::Bold),
            Cell::new(summary.count),
            Cell::new(format!("{:.2}", summary.raw_points)),
            Cell::new(format!("{:.2}", summary.max_possible)),
            Cell::new(format!("{:.1}", summary.raw_percentage)),
            score,
            confidence_cell(summary.confidence),
        ]);
    }
    right_align(&mut table, 1..=5);
    println!("{}", table);
}

pub fn summary(results: &[(String, Resolution)]) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("Evaluation").add_attribute(Attribute::Bold),
        Cell::new("Source"),
        Cell::new("Total"),
        Cell::new("Max"),
        Cell::new("Divider"),
        Cell::new("Final").fg(Color::Cyan),
        Cell::new("Confidence"),
    ]);

    for (name, resolution) in results {
        let row = match resolution {
            Resolution::Scored(state) => vec![
                Cell::new(name).add_attribute(Attribute::Bold),
                Cell::new(source_label(state.source)),
                Cell::new(format!("{:.2}", state.total_points)),
                Cell::new(format!("{:.2}", state.max_potential_points)),
                Cell::new(format!("{:.4}", state.divider)),
                Cell::new(format!("{:.1}", state.display_final_score())).fg(Color::Cyan),
                confidence_cell(state.confidence),
            ],
            Resolution::NoScoreData(_) => vec![
                Cell::new(name).add_attribute(Attribute::Bold),
                Cell::new("not yet scored").fg(Color::Red),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new("-"),
                Cell::new("-"),
            ],
        };
        table.add_row(row);
    }
    right_align(&mut table, 2..=5);
    println!("\n{}", table);
}

pub fn catalog(skills: &[&SkillDefinition], catalog: &SkillCatalog) {
    let mut table = Table::new();
    table
        .load_preset(ASCII_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.add_row(vec![
        Cell::new("Id").add_attribute(Attribute::Bold),
        Cell::new("Skill"),
        Cell::new("Category"),
        Cell::new("Polarity"),
        Cell::new("Max"),
        Cell::new("Weight"),
    ]);

    for skill in skills {
        let polarity = if skill.is_good_skill {
            Cell::new("good").fg(Color::Green)
        } else {
            Cell::new("bad").fg(Color::Red)
        };
        table.add_row(vec![
            Cell::new(skill.id),
            Cell::new(&skill.name),
            Cell::new(skill.category.to_string()),
            polarity,
            Cell::new(skill.max_score),
            Cell::new(format!("{:.2}", skill.weight)),
        ]);
    }
    right_align(&mut table, 4..=5);
    println!("{}", table);

    let ceiling: f64 = skills.iter().map(|s| s.max_points()).sum();
    println!(
        "{} of {} skills, weighted ceiling {:.1}",
        skills.len(),
        catalog.len(),
        ceiling
    );
}
