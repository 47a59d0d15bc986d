// Wed Feb 04 2026 - Alex

use crate::config::ScanConfig;
use crate::memory::{select_processes, ImageMemory, MemoryReader, ProcessMemory};
use crate::rules::CompiledRules;
use crate::scan::{plan, RuleMatch, ScanDriver};
use crate::utils::logging::ScopedTimer;
use anyhow::Context;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use serde::Serialize;

/// Matches collected from one scanned layer, in the order the driver
/// reported them.
#[derive(Debug, Clone, Serialize)]
pub struct LayerMatches {
    pub pid: Option<i32>,
    pub source: String,
    pub matches: Vec<RuleMatch>,
}

/// One full scan run: select the targets, plan each layer's regions with
/// the engine's geometry and drive the matcher over them. Independent
/// processes are scanned in parallel; units within one layer stay
/// sequential.
pub struct ScanSession<'a> {
    config: &'a ScanConfig,
    rules: &'a CompiledRules,
}

impl<'a> ScanSession<'a> {
    pub fn new(config: &'a ScanConfig, rules: &'a CompiledRules) -> Self {
        Self { config, rules }
    }

    pub fn run(&self) -> anyhow::Result<Vec<LayerMatches>> {
        if let Some(image_path) = &self.config.image {
            let image = ImageMemory::open(image_path)
                .with_context(|| format!("failed to open image {}", image_path.display()))?;
            let matches = self
                .scan_layer(&image)
                .with_context(|| format!("failed to scan image {}", image_path.display()))?;
            return Ok(vec![LayerMatches {
                pid: None,
                source: image.layer_name().to_string(),
                matches,
            }]);
        }

        let targets = select_processes(self.config.pid).context("process selection failed")?;
        log::info!("scanning {} process(es)", targets.len());

        let progress = if self.config.show_progress && targets.len() > 1 {
            let bar = ProgressBar::new(targets.len() as u64);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            Some(bar)
        } else {
            None
        };

        let scan_one = |target: &crate::memory::ProcessInfo| -> Option<LayerMatches> {
            let result = self.scan_process(target.pid);
            if let Some(bar) = &progress {
                bar.inc(1);
                bar.set_message(target.name.clone());
            }
            match result {
                Ok(matches) => Some(LayerMatches {
                    pid: Some(target.pid),
                    source: target.name.clone(),
                    matches,
                }),
                Err(e) => {
                    log::warn!("skipping {} ({}): {}", target.pid, target.name, e);
                    None
                }
            }
        };

        let results: Vec<LayerMatches> = if self.config.parallel && targets.len() > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.max_threads)
                .build()
                .context("failed to build scan thread pool")?;
            pool.install(|| targets.par_iter().filter_map(scan_one).collect())
        } else {
            targets.iter().filter_map(scan_one).collect()
        };

        if let Some(bar) = progress {
            bar.finish_and_clear();
        }

        Ok(results)
    }

    fn scan_process(&self, pid: i32) -> anyhow::Result<Vec<RuleMatch>> {
        let process = ProcessMemory::attach(pid)?;
        self.scan_layer(&process)
    }

    fn scan_layer(&self, reader: &dyn MemoryReader) -> anyhow::Result<Vec<RuleMatch>> {
        let _timer = ScopedTimer::new(reader.layer_name());
        let regions = reader.get_regions()?;
        log::debug!("{}: {} mapped region(s)", reader.layer_name(), regions.len());

        let plan = plan(regions, reader.layer_name(), self.rules.parameters());
        let driver = ScanDriver::new(reader, self.rules).with_max_address(self.config.max_size);
        let matches = driver.scan_to_vec(plan)?;

        log::debug!("{}: {} match(es)", reader.layer_name(), matches.len());
        Ok(matches)
    }
}
