//! Shuffling with a minimum distance between songs of the same interpret

mod group;
mod scheduler;

pub use scheduler::ShuffleScheduler;
