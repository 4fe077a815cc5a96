use crate::catalog::loader::load_catalog_file;
use crate::catalog::SkillCatalog;
use crate::config::EngineConfig;
use crate::error::{ScResult, ScoreError};
use crate::scorer::calibrate::usable_custom;
use crate::scorer::ScoringEngine;
use std::path::Path;
use tracing::debug;
use typed_builder::TypedBuilder;

#[derive(TypedBuilder)]
pub struct EngineBuildParams {
    pub catalog: SkillCatalog,
    #[builder(default)]
    pub config: EngineConfig,
    #[builder(default = false)]
    pub debug: bool,
}

impl EngineBuildParams {
    /// Engine over a catalog file, or the embedded catalog when `catalog_path` is `None`.
    pub fn load_from_disk<P: AsRef<Path>>(
        catalog_path: Option<P>,
        config: Option<EngineConfig>,
        debug: bool,
    ) -> ScResult<ScoringEngine> {
        let config = config.unwrap_or_default();

        let catalog = match catalog_path {
            Some(path) => load_catalog_file(path, config.ranges.clone())?,
            None => SkillCatalog::standard(config.ranges.clone())?,
        };

        EngineBuildParams::builder()
            .catalog(catalog)
            .config(config)
            .debug(debug)
            .build()
            .build_engine()
    }

    pub fn build_engine(self) -> ScResult<ScoringEngine> {
        let catalog = self.catalog;
        let config = self.config;
        let debug = self.debug;

        if let Some(divider) = config.custom_divider {
            if usable_custom(Some(divider)).is_none() {
                return Err(ScoreError::Config(format!(
                    "custom_divider must be a positive number, got {}",
                    divider
                )));
            }
        }

        let estimate_factors = config.get_estimate_factors()?;

        if debug {
            debug!(
                "   [Debug] Catalog: {} skills, max potential {:.1}",
                catalog.len(),
                catalog.max_potential_points()
            );
            for category in catalog.ranges().ranges() {
                debug!(
                    "   [Debug] {} ids {}..={} inverted={}",
                    category.category,
                    category.first_id,
                    category.last_id,
                    catalog.is_inverted(category.category)
                );
            }
        }

        Ok(ScoringEngine {
            catalog,
            config,
            estimate_factors,
            debug,
        })
    }
}
