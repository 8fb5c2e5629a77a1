// ABOUTME: CommandRunner that records invocations and replays queued responses.
// ABOUTME: Stands in for docker-compose and docker in orchestrator tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use stevedore::runtime::{CommandError, CommandRunner};

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub program: String,
    pub args: Vec<String>,
}

impl Call {
    /// Arguments after the `-f <file> -p <project>` prefix, joined by spaces.
    pub fn verb(&self) -> String {
        let args = if self.args.first().map(String::as_str) == Some("-f") {
            &self.args[4.min(self.args.len())..]
        } else {
            &self.args[..]
        };
        args.join(" ")
    }
}

pub const UP: &str = "--verbose up -d";
pub const PRUNE: &str = "volume prune -f";

/// Output `docker-compose --verbose up -d` prints for containers `ids`.
pub fn up_output(ids: &[&str]) -> String {
    let mut out = String::from("compose.config.config.find: Using configuration files: ./docker-compose.yaml\n");
    for id in ids {
        out.push_str(&format!(
            "compose.cli.verbose_proxy.proxy_callable: docker start <- (u'{id}')\n"
        ));
        out.push_str(&format!(
            "compose.cli.verbose_proxy.proxy_callable: docker inspect_container <- (u'{id}')\n"
        ));
    }
    out.push_str("Creating done\n");
    out
}

/// Replays queued responses keyed by [`Call::verb`].
///
/// Unqueued verbs succeed; `up` then prints the default container ids.
pub struct ScriptedRunner {
    calls: Mutex<Vec<Call>>,
    queued: Mutex<HashMap<String, VecDeque<Result<String, String>>>>,
    default_up: String,
}

impl ScriptedRunner {
    pub fn new(default_ids: &[&str]) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            queued: Mutex::new(HashMap::new()),
            default_up: up_output(default_ids),
        }
    }

    /// Queue a successful output for the next call of `verb`.
    pub fn succeed(&self, verb: &str, output: impl Into<String>) {
        self.queued
            .lock()
            .entry(verb.to_string())
            .or_default()
            .push_back(Ok(output.into()));
    }

    /// Queue a failure (exit status 1) for the next call of `verb`.
    pub fn fail(&self, verb: &str, output: impl Into<String>) {
        self.queued
            .lock()
            .entry(verb.to_string())
            .or_default()
            .push_back(Err(output.into()));
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn verbs(&self) -> Vec<String> {
        self.calls.lock().iter().map(Call::verb).collect()
    }

    pub fn count(&self, verb: &str) -> usize {
        self.calls.lock().iter().filter(|c| c.verb() == verb).count()
    }

    /// Forget recorded calls, keeping queued responses.
    pub fn clear_calls(&self) {
        self.calls.lock().clear();
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, program: &str, args: &[String]) -> Result<String, CommandError> {
        let call = Call {
            program: program.to_string(),
            args: args.to_vec(),
        };
        let verb = call.verb();
        self.calls.lock().push(call);

        let queued = self
            .queued
            .lock()
            .get_mut(&verb)
            .and_then(VecDeque::pop_front);
        match queued {
            Some(Ok(output)) => Ok(output),
            Some(Err(output)) => Err(CommandError::failed(
                format!("{} {}", program, args.join(" ")),
                Some(1),
                output,
            )),
            None if verb == UP => Ok(self.default_up.clone()),
            None => Ok(String::new()),
        }
    }
}
