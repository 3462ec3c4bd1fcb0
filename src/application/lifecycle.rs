//! Request lifecycle with a generation-token stale-response guard.
//!
//! Every new attempt and every reset bumps the generation. A completion is
//! applied only when the ticket it carries still matches the current
//! generation, so the most recently initiated request always wins.

/// Where a request lifecycle currently stands.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase<T> {
    Idle,
    Validating,
    Loading,
    Success(T),
    Error(String),
}

impl<T> Phase<T> {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Loading => "loading",
            Self::Success(_) => "success",
            Self::Error(_) => "error",
        }
    }
}

/// Generation token handed out when a request starts.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

impl Ticket {
    #[must_use]
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// State of one request slot: `{loading, result, error}` as a single value.
#[derive(Debug, Clone, PartialEq)]
pub struct Lifecycle<T> {
    phase: Phase<T>,
    generation: u64,
}

impl<T> Default for Lifecycle<T> {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            generation: 0,
        }
    }
}

impl<T> Lifecycle<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn phase(&self) -> &Phase<T> {
        &self.phase
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Enter `Validating` and hand back the phase it replaced.
    ///
    /// The generation is left alone: only [`begin`](Self::begin) supersedes
    /// a pending request.
    #[must_use]
    pub fn validating(&mut self) -> Phase<T> {
        std::mem::replace(&mut self.phase, Phase::Validating)
    }

    /// Validation failed locally; nothing was sent and the phase seen
    /// before validation is restored.
    pub fn abandon(&mut self, previous: Phase<T>) {
        self.phase = previous;
    }

    /// Start a request: clears prior result and error, enters `Loading`.
    pub fn begin(&mut self) -> Ticket {
        self.generation += 1;
        self.phase = Phase::Loading;
        Ticket(self.generation)
    }

    /// Fail without issuing a request (e.g. a locally refused submission).
    pub fn fail(&mut self, message: impl Into<String>) {
        self.generation += 1;
        self.phase = Phase::Error(message.into());
    }

    #[must_use]
    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.generation && matches!(self.phase, Phase::Loading)
    }

    /// Apply a completion. Returns `false` and leaves the state untouched
    /// when the ticket has been superseded.
    pub fn resolve(&mut self, ticket: Ticket, outcome: Result<T, String>) -> bool {
        if !self.is_current(ticket) {
            tracing::debug!(
                "Ignoring stale completion (ticket {}, current {})",
                ticket.0,
                self.generation
            );
            return false;
        }
        self.phase = match outcome {
            Ok(value) => Phase::Success(value),
            Err(message) => Phase::Error(message),
        };
        true
    }

    /// Back to `Idle`; pending completions become no-ops.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.phase = Phase::Idle;
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.phase, Phase::Loading)
    }

    #[must_use]
    pub fn value(&self) -> Option<&T> {
        match &self.phase {
            Phase::Success(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.phase {
            Phase::Error(message) => Some(message),
            _ => None,
        }
    }
}
