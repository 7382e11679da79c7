//! Controller-wide constants.

use std::time::Duration;

/// Number of hardware synchronization groups the motor controller exposes.
pub const MAX_GROUPS: usize = 8;

/// Interval between availability checks while waiting for a free group.
pub const GROUP_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Commanded positions this close past a travel limit are still accepted.
pub const TRAVEL_LIMIT_TOLERANCE: f64 = 0.001;

/// Default number of samples an axis datalog can buffer.
pub const DEFAULT_LOG_CAPACITY: usize = 4096;

/// Directory (below the application directory) receiving per-axis position logs.
pub const LOG_DIR_NAME: &str = "logs";

/// Group configuration pushed before the drive-side axis-on procedure:
/// relaxes the watchdog and disables the position-ok window.
pub const GROUP_ENABLE_PROGRAM: &str = "SRB UPGRADE, 0xF7FF, 0x0; POSOKLIM = 0U; TONPOSOK = 65535U;";

/// Drive variable the axis-on procedure reports completion through.
pub const FUNC_DONE_VARIABLE: &str = "func_done";

/// Value `func_done` is primed with before calling the axis-on procedure.
pub const INITIAL_FUNC_DONE: i32 = 0;

/// Drive-side label of the axis-on procedure.
pub const AXIS_ON_LABEL: &str = "func_my_axison";

/// Controller program removing every axis from group `n`.
pub fn remove_group_program(group: u8) -> String {
    format!("REMGRID({group});")
}

/// Per-axis position log file name (`axis{ID}_positions.log`).
pub fn position_log_file_name(axis: u8) -> String {
    format!("axis{axis}_positions.log")
}
