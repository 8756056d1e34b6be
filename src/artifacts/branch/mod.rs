pub mod branch_name;

/// Branch names live as plain files in a flat directory, so path separators
/// are rejected together with the usual ref-name hazards.
pub const INVALID_BRANCH_NAME_REGEX: &str =
    r"^\.|\.\.|/|\.lock$|@\{|[\x00-\x20\*:\?\[\\~\^\x7f]";
