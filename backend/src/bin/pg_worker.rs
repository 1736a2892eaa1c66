//! Privilege-dropping helper for the embedded PostgreSQL test clusters.
//!
//! `pg_embedded_setup_unpriv` re-executes this binary as an unprivileged
//! user when the suites run as root. Arguments are `<setup|start|stop>` and
//! the path of a JSON [`WorkerPayload`].

use std::env;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{Context, Report, Result, bail, eyre};
use pg_embedded_setup_unpriv::worker::WorkerPayload;
use postgresql_embedded::PostgreSQL;
use tokio::runtime::Builder;

fn main() -> Result<()> {
    color_eyre::install()?;
    let (step, payload_path) = parse_args(env::args_os())?;
    let payload = read_payload(&payload_path)?;
    run_step(step, payload)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Setup,
    Start,
    Stop,
}

impl Step {
    fn parse(raw: &str) -> Result<Self> {
        match raw {
            "setup" => Ok(Self::Setup),
            "start" => Ok(Self::Start),
            "stop" => Ok(Self::Stop),
            other => bail!("unknown pg_worker step '{other}'; expected setup, start, or stop"),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Setup => "setup",
            Self::Start => "start",
            Self::Stop => "stop",
        })
    }
}

fn parse_args(args: impl IntoIterator<Item = OsString>) -> Result<(Step, PathBuf)> {
    let mut args = args.into_iter().skip(1);
    let step = args.next().ok_or_else(|| eyre!("missing step argument"))?;
    let step = Step::parse(&step.to_string_lossy())?;
    let payload = args
        .next()
        .map(PathBuf::from)
        .ok_or_else(|| eyre!("missing payload path argument"))?;
    if let Some(extra) = args.next() {
        bail!("unexpected argument '{}'", extra.to_string_lossy());
    }
    Ok((step, payload))
}

fn read_payload(path: &Path) -> Result<WorkerPayload> {
    let raw = std::fs::read(path)
        .with_context(|| format!("reading worker payload {}", path.display()))?;
    serde_json::from_slice(&raw)
        .with_context(|| format!("parsing worker payload {}", path.display()))
}

fn run_step(step: Step, payload: WorkerPayload) -> Result<()> {
    let settings = payload
        .settings
        .into_settings()
        .map_err(|err| Report::new(err).wrap_err("rebuilding postgres settings"))?;
    for (key, value) in payload.environment {
        // SAFETY: single-threaded; the runtime below has not been built yet.
        unsafe {
            match value {
                Some(value) => env::set_var(&key, value.expose()),
                None => env::remove_var(&key),
            }
        }
    }

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("building pg_worker runtime")?;
    let mut postgres = PostgreSQL::new(settings);
    runtime
        .block_on(async {
            match step {
                Step::Setup => postgres.setup().await,
                Step::Start => postgres.start().await,
                Step::Stop => postgres.stop().await,
            }
        })
        .with_context(|| format!("postgres {step} failed"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn args(values: &[&str]) -> Vec<OsString> {
        values.iter().map(OsString::from).collect()
    }

    #[rstest]
    #[case("setup", Step::Setup)]
    #[case("start", Step::Start)]
    #[case("stop", Step::Stop)]
    fn steps_parse_from_their_names(#[case] raw: &str, #[case] expected: Step) {
        let (step, path) = parse_args(args(&["pg_worker", raw, "/tmp/payload.json"]))
            .expect("valid arguments");
        assert_eq!(step, expected);
        assert_eq!(path, PathBuf::from("/tmp/payload.json"));
    }

    #[rstest]
    #[case(&["pg_worker"], "missing step")]
    #[case(&["pg_worker", "setup"], "missing payload")]
    #[case(&["pg_worker", "restart", "/tmp/p.json"], "unknown pg_worker step")]
    #[case(&["pg_worker", "stop", "/tmp/p.json", "extra"], "unexpected argument")]
    fn bad_arguments_are_rejected(#[case] raw: &[&str], #[case] expected: &str) {
        let err = parse_args(args(raw)).expect_err("invalid arguments");
        assert!(err.to_string().contains(expected), "{err}");
    }
}
