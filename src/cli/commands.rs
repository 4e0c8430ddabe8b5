//! CLI command implementations
//!
//! Each command boots a fresh runtime over a file-backed accessor,
//! registers the experiences file, runs, and tears the runtime down.

use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use crate::clock::{Clock, SystemClock};
use crate::context::PartialContext;
use crate::runtime::{EngineConfig, Runtime};
use crate::storage::FileStorage;

use super::args::{Cli, Command, EngineArgs};
use super::errors::{CliError, CliResult};
use super::io::{read_experiences, write_response};

/// Parse arguments and run the selected command
pub async fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command).await
}

/// Run the appropriate command based on CLI args
pub async fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Evaluate { engine, repeat } => evaluate(&engine, repeat).await,
        Command::Explain { engine, id } => explain(&engine, &id).await,
    }
}

/// Evaluate `repeat` times and print every decision
pub async fn evaluate(args: &EngineArgs, repeat: u32) -> CliResult<()> {
    let runtime = boot(args).await?;

    let decisions = with_teardown(&runtime, |runtime| {
        let mut decisions = Vec::with_capacity(repeat as usize);
        for _ in 0..repeat {
            decisions.push(runtime.evaluate(context(args))?);
        }
        Ok(decisions)
    })
    .await?;

    write_response(json!({ "decisions": decisions }))
}

/// Explain one experience and print the dry-run decision
pub async fn explain(args: &EngineArgs, id: &str) -> CliResult<()> {
    let runtime = boot(args).await?;

    let decision = with_teardown(&runtime, |runtime| {
        runtime
            .explain_with_context(id, context(args))?
            .ok_or_else(|| CliError::unknown_experience(id))
    })
    .await?;

    write_response(serde_json::to_value(&decision)?)
}

/// Run `work`, then destroy the runtime whether or not it succeeded.
/// An error from `work` takes precedence over one from teardown.
async fn with_teardown<T>(
    runtime: &Runtime,
    work: impl FnOnce(&Runtime) -> CliResult<T>,
) -> CliResult<T> {
    let result = work(runtime);
    let teardown = runtime.destroy().await;
    let value = result?;
    teardown?;
    Ok(value)
}

async fn boot(args: &EngineArgs) -> CliResult<Runtime> {
    let config = load_config(args.config.as_deref())?;
    let experiences = read_experiences(&args.experiences)?;

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let storage = FileStorage::open(&args.state, Arc::clone(&clock))?;
    let runtime = Runtime::new(Arc::new(storage), clock);

    runtime.init(config).await?;
    for experience in experiences {
        runtime.register(&experience.id, experience.definition)?;
    }

    Ok(runtime)
}

fn load_config(path: Option<&Path>) -> CliResult<EngineConfig> {
    match path {
        Some(path) => Ok(EngineConfig::load(path)?),
        None => Ok(EngineConfig::default()),
    }
}

fn context(args: &EngineArgs) -> PartialContext {
    match &args.url {
        Some(url) => PartialContext::new().with_url(url.as_str()),
        None => PartialContext::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::EventKind;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn write_experiences(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("xp.json");
        fs::write(
            &path,
            r#"[{"id": "welcome", "type": "banner",
                 "targeting": {"url": {"contains": "/home"}},
                 "frequency": {"max": 2, "per": "day"}}]"#,
        )
        .unwrap();
        path
    }

    fn args(dir: &Path, url: &str) -> EngineArgs {
        EngineArgs {
            experiences: write_experiences(dir),
            config: None,
            state: dir.join("state.json"),
            url: Some(url.to_string()),
        }
    }

    #[tokio::test]
    async fn test_daily_cap_survives_between_runs() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(dir.path(), "https://x.com/home");

        let first = boot(&args).await.unwrap();
        assert!(first.evaluate(context(&args)).unwrap().show);
        assert!(first.evaluate(context(&args)).unwrap().show);
        first.destroy().await.unwrap();

        let second = boot(&args).await.unwrap();
        let decision = second.evaluate(context(&args)).unwrap();
        assert!(!decision.show);
        assert!(decision.reasons[0].contains("frequency cap reached"));
    }

    #[tokio::test]
    async fn test_explain_unknown_id() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(dir.path(), "https://x.com/home");

        let err = explain(&args, "missing").await.unwrap_err();
        assert_eq!(err.code_str(), "XP_CLI_UNKNOWN_EXPERIENCE");
    }

    #[tokio::test]
    async fn test_teardown_runs_when_work_fails() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(dir.path(), "https://x.com/home");
        let runtime = boot(&args).await.unwrap();

        let disabled = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&disabled);
        runtime.on(EventKind::Disabled, move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        let result: CliResult<()> =
            with_teardown(&runtime, |_| Err(CliError::unknown_experience("missing"))).await;

        assert_eq!(result.unwrap_err().code_str(), "XP_CLI_UNKNOWN_EXPERIENCE");
        assert_eq!(disabled.load(Ordering::SeqCst), 1);
        assert!(!runtime.is_ready());
    }

    #[tokio::test]
    async fn test_corrupt_state_file_is_recovered() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(dir.path(), "https://x.com/home");
        fs::write(&args.state, "{truncated").unwrap();

        run_command(Command::Evaluate {
            engine: args.clone(),
            repeat: 1,
        })
        .await
        .unwrap();

        let content = fs::read_to_string(&args.state).unwrap();
        assert!(content.contains("xp:freq:welcome:experience:day"));
    }

    #[tokio::test]
    async fn test_missing_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args(dir.path(), "https://x.com/home");
        args.config = Some(dir.path().join("missing.json"));

        let err = boot(&args).await.unwrap_err();
        assert_eq!(err.code_str(), "XP_CLI_CONFIG_ERROR");
    }
}
