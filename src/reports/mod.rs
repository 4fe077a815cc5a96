mod tables;

pub use self::tables::{
    catalog as print_catalog, categories as print_category_report,
    summary as print_summary_report,
};

use speechscore::scorer::EvaluationScoreState;

pub fn print_issues(state: &EvaluationScoreState) {
    if state.issues.is_empty() {
        return;
    }
    println!("\n⚠️  {} issue(s) in {}:", state.issues.len(), state.evaluation_id);
    for issue in &state.issues {
        println!("   - {}", issue);
    }
}

pub fn print_failures(failures: &[(String, String)]) {
    println!("\n❌ {} file(s) could not be resolved:", failures.len());
    for (path, message) in failures {
        println!("   {}: {}", path, message);
    }
}
