//! Simulated time: slots, block height and unix time move forward only when
//! the caller asks them to.

use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use emulator_config::config::Emulator as EmulatorConfig;
use emulator_data_structures::chain::{Slot, UnixTime};

/// Snapshot of the simulated time
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct ClockState {
    /// Current slot
    pub slot: Slot,
    /// Current block height, `slot / block_slot_width`
    pub block_height: u64,
    /// Unix time in milliseconds
    pub time: UnixTime,
}

/// Clock of the emulator
#[derive(Clone, Debug)]
pub struct Clock {
    state: ClockState,
    block_slot_width: u64,
    slot_length_millis: i64,
}

/// Current wall clock time as a unix timestamp in milliseconds
pub fn get_timestamp_millis() -> UnixTime {
    Utc::now().timestamp_millis()
}

impl Clock {
    /// A clock at slot 0 whose time is `genesis_time`.
    ///
    /// A `block_slot_width` of 0 is treated as 1.
    pub fn new(genesis_time: UnixTime, block_slot_width: u64, slot_length: Duration) -> Self {
        Clock {
            state: ClockState {
                slot: 0,
                block_height: 0,
                time: genesis_time,
            },
            block_slot_width: block_slot_width.max(1),
            slot_length_millis: i64::try_from(slot_length.as_millis()).unwrap_or(i64::MAX),
        }
    }

    /// Build the clock described by the configuration, starting at the wall clock
    /// time when no genesis time is configured
    pub fn from_config(config: &EmulatorConfig) -> Self {
        let genesis_time = config.genesis_time.unwrap_or_else(get_timestamp_millis);

        Self::new(genesis_time, config.block_slot_width, config.slot_length)
    }

    /// Current time snapshot
    pub fn state(&self) -> ClockState {
        self.state
    }

    /// Number of slots per block
    pub fn block_slot_width(&self) -> u64 {
        self.block_slot_width
    }

    fn elapsed_millis(&self, slots: u64) -> i64 {
        i64::try_from(slots)
            .unwrap_or(i64::MAX)
            .saturating_mul(self.slot_length_millis)
    }

    /// Move `count` slots forward. Returns `true` when the block height increased.
    pub fn advance_slots(&mut self, count: u64) -> bool {
        let previous_height = self.state.block_height;

        self.state.slot += count;
        self.state.time = self.state.time.saturating_add(self.elapsed_millis(count));
        self.state.block_height = self.state.slot / self.block_slot_width;

        self.state.block_height > previous_height
    }

    /// Move `count` blocks forward
    pub fn advance_blocks(&mut self, count: u64) {
        let slots = count * self.block_slot_width;

        self.state.block_height += count;
        self.state.slot += slots;
        self.state.time = self.state.time.saturating_add(self.elapsed_millis(slots));
    }
}
