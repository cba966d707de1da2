//! Labels and property keys of the IMDb-shaped graph the workload targets

// Vertex labels
pub const PERSON: &str = "person";
pub const TITLE: &str = "title";
pub const GENRE_LABEL: &str = "genre";

// Edge labels
pub const KNOWN_FOR_TITLE: &str = "knownForTitle";
pub const DIRECTED: &str = "directed";
pub const WROTE: &str = "wrote";
/// title -> genre
pub const GENRE: &str = "genre";

// Property keys
pub const NAME: &str = "name";
pub const PRIMARY_TITLE: &str = "primaryTitle";
/// Multi-valued: list of profession names
pub const PROFESSIONS: &str = "professions";
pub const START_YEAR: &str = "startYear";
pub const END_YEAR: &str = "endYear";

// Professions
pub const ACTOR: &str = "actor";
pub const DIRECTOR: &str = "director";
pub const WRITER: &str = "writer";
