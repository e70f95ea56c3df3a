//! Default configuration values

/// Build backend invoked once per package
pub const DEFAULT_BUILD_BACKEND: &str = "scons";

/// Harness used to run a single test executable
pub const DEFAULT_TEST_HARNESS: &str = "casacore_assay";

/// Staging directory (relative to the source root) for local installs
pub const DEFAULT_STAGE_DIR: &str = "stage";

/// `casacoredir` used for a system install without an explicit prefix
pub const DEFAULT_SYSTEM_PREFIX: &str = "/usr";

/// Test directory inside each package
pub const DEFAULT_TESTS_DIR: &str = "tests";

/// File name prefix of test executables
pub const DEFAULT_TEST_PREFIX: &str = "t";

/// Harness output markers that classify a test as passed
pub const DEFAULT_PASS_MARKERS: &[&str] = &["PASS", "OK"];

/// Environment variable pointing tests at their data directory
pub const DEFAULT_DATA_PATH_VAR: &str = "AIPSPATH";

/// Project-local settings file name
pub const SETTINGS_FILE_NAME: &str = "casabuild.toml";

/// Exit code used when the run was interrupted by the user
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// Minimum proptest iterations
pub const MIN_PROPTEST_ITERATIONS: u32 = 100;
