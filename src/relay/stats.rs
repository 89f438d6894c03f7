/// Counters collected by a polling loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelayStats {
    /// Completed poll/dispatch cycles.
    pub iterations: u64,
    /// Messages handed to the dispatcher.
    pub messages_seen: u64,
    /// `/translate` and `/stop` commands applied to the registry.
    pub commands_applied: u64,
    /// Content messages fanned out to at least one subscriber.
    pub messages_routed: u64,
    /// Translations posted successfully.
    pub deliveries: u64,
    /// Failed deliveries and dropped commands.
    pub failures: u64,
    /// Iterations that ended without dispatching (empty room, unreachable source).
    pub skipped_iterations: u64,
}
