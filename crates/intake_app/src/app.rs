use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use intake_core::{update, AppState, FileDescriptor, FileStatus, Msg};
use intake_engine::{load_payload, BatchReport, EngineHandle, ReqwestBackend};
use intake_logging::{intake_error, intake_info, intake_warn};

use crate::cli::Args;
use crate::config::AppConfig;
use crate::effects::{EffectRunner, Inbox};
use crate::render::Renderer;

const TICK: Duration = Duration::from_millis(75);

pub fn run_app(args: &Args, config: &AppConfig) -> anyhow::Result<()> {
    let backend = ReqwestBackend::new(config.backend_settings()?)
        .context("failed to build http backend")?;
    let mut upload = config.upload_settings();
    if args.no_notify {
        upload.notify_stage = false;
    }
    intake_info!(
        "Backend {} (notify stage {})",
        config.backend.api_base,
        if upload.notify_stage { "on" } else { "off" }
    );

    let mut app = App::new(EffectRunner::new(EngineHandle::new(Arc::new(backend), upload)));

    let mut descriptors = Vec::new();
    for path in &args.files {
        match load_payload(path) {
            Ok(payload) if descriptors.iter().any(|d: &FileDescriptor| d.name == payload.name) => {
                intake_warn!("Skipping {:?}: {} is already selected", path, payload.name);
                eprintln!("Skipping {}: {} is already selected", path.display(), payload.name);
            }
            Ok(payload) => {
                descriptors.push(payload.descriptor());
                app.runner.stage(payload);
            }
            Err(err) => {
                intake_error!("Skipping {:?}: {}", path, err);
                eprintln!("Skipping {}: {}", path.display(), err);
            }
        }
    }
    if descriptors.is_empty() {
        bail!("none of the given files could be read");
    }

    app.dispatch(Msg::FilesSelected(descriptors));
    let reports = app.run_until_idle()?;
    app.print_summaries();

    let failed: usize = reports
        .iter()
        .map(|report| report.failed.len() + report.rejected.len())
        .sum();
    if failed > 0 {
        bail!("{failed} file(s) did not complete");
    }
    Ok(())
}

struct App {
    state: AppState,
    runner: EffectRunner,
    renderer: Renderer,
    batches_in_flight: usize,
}

impl App {
    fn new(runner: EffectRunner) -> Self {
        Self {
            state: AppState::new(),
            runner,
            renderer: Renderer::new(),
            batches_in_flight: 0,
        }
    }

    fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        let view = was_dirty.then(|| state.view());
        self.state = state;

        self.batches_in_flight += self.runner.enqueue(effects);
        if let Some(view) = view {
            for line in self.renderer.render(&view) {
                println!("{line}");
            }
        }
    }

    fn run_until_idle(&mut self) -> anyhow::Result<Vec<BatchReport>> {
        let mut reports = Vec::new();
        while self.batches_in_flight > 0 {
            match self.runner.next(TICK) {
                Some(Inbox::Msg(msg)) => self.dispatch(msg),
                Some(Inbox::BatchFinished(report)) => {
                    intake_info!(
                        "Batch finished: {} completed, {} failed, {} rejected",
                        report.completed.len(),
                        report.failed.len(),
                        report.rejected.len()
                    );
                    self.batches_in_flight -= 1;
                    reports.push(report);
                }
                None => self.dispatch(Msg::Tick),
            }
        }
        if self.state.records().iter().any(|r| !r.status.is_terminal()) {
            bail!("engine finished with files still in flight");
        }
        Ok(reports)
    }

    fn print_summaries(&self) {
        for record in self.state.records() {
            if record.status != FileStatus::Completed {
                continue;
            }
            match self.state.summary(&record.name) {
                Some(summary) => println!("\n== {} ==\n{}", record.name, summary),
                None => println!("\n== {} ==\n(no summary)", record.name),
            }
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        if self.batches_in_flight > 0 {
            self.dispatch(Msg::Teardown);
        }
    }
}
