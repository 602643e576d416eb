//! Column and table names shared by every stage of the pipeline

/// Join and dedupe key present in both input files
pub const ID_COLUMN: &str = "id";

/// Column holding the `name-digit;name-digit;...` label encoding
pub const CATEGORIES_COLUMN: &str = "categories";

/// Separator between tokens inside the categories field
pub const CATEGORY_SEPARATOR: char = ';';

/// Table written to the output database unless configuration overrides it
pub const DEFAULT_TABLE_NAME: &str = "df";

/// Suffixes applied to non-key columns present in both inputs
pub const LEFT_SUFFIX: &str = "_x";
pub const RIGHT_SUFFIX: &str = "_y";

pub const DEFAULT_CONFIG_FILE: &str = "disaster_etl.toml";
pub const CONFIG_ENV_VAR: &str = "DISASTER_ETL_CONFIG";
pub const DEFAULT_LOG_DIR: &str = "logs";

pub const USAGE: &str = "Please provide the filepaths of the messages and categories \
datasets as the first and second argument respectively, as \
well as the filepath of the database to save the cleaned data \
to as the third argument. \n\nExample: process_data \
disaster_messages.csv disaster_categories.csv \
DisasterResponse.db";
