#![forbid(unsafe_code)]

//! tagflow demo binary entry point.

use std::io;
use std::time::{Duration, Instant};

use tagflow_core::event::Event;
use tagflow_core::terminal_session::{SessionOptions, TerminalSession};
use tagflow_demo::app::{App, Control};
use tagflow_demo::cli::Opts;
use tagflow_demo::error::DemoError;
use tagflow_demo::{logging, sample};
use tagflow_labels::LabelSet;
use tagflow_render::frame::Frame;
use tagflow_render::presenter::Presenter;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

fn main() {
    let opts = Opts::parse();

    if let Err(e) = logging::init(&opts.log_file, &opts.log_filter) {
        eprintln!("Failed to initialize logging: {e}");
        std::process::exit(1);
    }

    if let Err(e) = run(&opts) {
        tracing::error!(error = %e, "demo failed");
        eprintln!("Runtime error: {e}");
        std::process::exit(1);
    }
}

fn run(opts: &Opts) -> Result<(), DemoError> {
    let labels = match &opts.labels {
        Some(path) => LabelSet::load(path)?,
        None => sample::pipeline_run_labels(),
    };
    tracing::info!(labels = labels.len(), thresholds = ?opts.thresholds, "starting");

    let mut app = App::new(labels, opts);
    let session = TerminalSession::new(SessionOptions {
        alternate_screen: true,
        mouse_capture: opts.mouse,
        bracketed_paste: true,
    })?;
    let mut presenter = Presenter::new(io::stdout());

    let started = Instant::now();
    let exit_after = (opts.exit_after_ms > 0).then(|| Duration::from_millis(opts.exit_after_ms));

    loop {
        let (width, height) = session.size()?;
        let mut frame = Frame::new(width, height);
        app.render(&mut frame);
        presenter.present(&frame)?;

        if exit_after.is_some_and(|limit| started.elapsed() >= limit) {
            tracing::info!("exit-after elapsed");
            break;
        }
        if !session.poll_event(POLL_INTERVAL)? {
            continue;
        }
        let Some(event) = session.read_event()? else {
            continue;
        };
        if let Event::Resize { width, height } = event {
            tracing::debug!(width, height, "resize");
            presenter.invalidate();
            continue;
        }
        if app.handle_event(&event) == Control::Quit {
            break;
        }
    }

    presenter.flush()?;
    drop(session);
    tracing::info!("stopped");
    Ok(())
}
