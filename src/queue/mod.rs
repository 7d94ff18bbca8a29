//! Matchmaking queue: tickets, pairing policies, the per-mode pool and
//! the periodic poll driver

pub mod matchmaker;
pub mod policy;
pub mod scheduler;
pub mod ticket;

// Re-export commonly used types
pub use matchmaker::MatchmakingQueue;
pub use policy::{
    AnchorExpansionPolicy, AnchorPolicyConfig, BestPairPolicy, BestPairPolicyConfig, MatchPolicy,
};
pub use scheduler::{ChannelMatchSink, MatchSink, QueueScheduler, SchedulerConfig};
pub use ticket::MatchTicket;
