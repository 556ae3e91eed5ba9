use std::sync::Arc;
use std::time::Duration;

use atlas_loader::{Loader, ProgressReporter};
use colored::Colorize;

use super::SourceArgs;

pub async fn run(
    args: &SourceArgs,
    interval_ms: u64,
    cycles: Option<u64>,
    progress: bool,
) -> Result<(), String> {
    let mut loader = args.countries_loader()?;
    if progress {
        loader = loader.with_progress(ProgressReporter::new(|stage| {
            eprintln!("  {} {stage}", "..".dimmed());
        }));
    }
    let interval = Duration::from_millis(interval_ms);
    let mut last = None;
    let mut poll = 0u64;

    loop {
        poll += 1;
        match loader.load(false).await {
            Ok(loaded) => {
                let changed = last.as_ref().is_none_or(|prev| !Arc::ptr_eq(prev, &loaded));
                tracing::debug!(poll, changed, "polled");
                if changed {
                    println!(
                        "  [{}] loaded {}, {}",
                        chrono::Local::now().format("%H:%M:%S"),
                        super::count(loaded.result.len(), "country", "countries"),
                        super::count(loaded.warnings.len(), "warning", "warnings"),
                    );
                    super::print_warnings(&loaded.warnings);
                    last = Some(loaded);
                }
            }
            // Keep watching; the last good result stays cached.
            Err(e) => eprintln!("  {} {e}", "error:".red().bold()),
        }

        if cycles.is_some_and(|n| poll >= n) {
            return match last {
                Some(_) => Ok(()),
                None => Err("no load succeeded".into()),
            };
        }
        tokio::time::sleep(interval).await;
    }
}
