// =============================================================================
// Application Identity
// =============================================================================

/// Application name in lowercase (for paths, identifiers and log filters)
pub const APP_NAME_LOWER: &str = "querybind";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name looked up in the working directory
pub const CONFIG_FILE_NAME: &str = "querybind.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "QUERYBIND_CONFIG";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "QUERYBIND_LOG";

// =============================================================================
// Reserved Request Parameters
// =============================================================================

/// Zero-based page number
pub const PARAM_PAGE: &str = "page";

/// Page size
pub const PARAM_SIZE: &str = "size";

/// Sort attribute path
pub const PARAM_SORT: &str = "sort";

/// Sort direction ("asc" or "desc")
pub const PARAM_DIRECTION: &str = "direction";

/// Free-text search term, also the display key in active filters
pub const PARAM_SEARCH: &str = "search";

/// Parameter names that can never be used as filter aliases
pub const RESERVED_PARAMS: &[&str] = &[
    PARAM_PAGE,
    PARAM_SIZE,
    PARAM_SORT,
    PARAM_DIRECTION,
    PARAM_SEARCH,
];

// =============================================================================
// Filter Value Literals
// =============================================================================

/// Equals-filter value selecting rows where the attribute IS NULL
pub const NULL_LITERAL: &str = "null";

/// Equals-filter value selecting rows where the attribute IS NOT NULL
pub const NOT_NULL_LITERAL: &str = "!null";

// =============================================================================
// Binding Defaults
// =============================================================================

/// Default page number
pub const DEFAULT_PAGE: u32 = 0;

/// Default items per page
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Default upper bound for the page size
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 100;

/// Default sort attribute
pub const DEFAULT_SORT: &str = "id";
