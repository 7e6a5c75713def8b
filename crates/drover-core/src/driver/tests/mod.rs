use super::*;
use crate::clock::ManualClock;
use crate::config::PriorityQueueConfig;
use crate::storage::MemoryStore;

mod common;
use common::*;

mod cutoff;
