mod apply;
mod config;
mod numeral;
mod planner;
mod sort;
mod source;
mod template;

pub use apply::{execute_plan, ExecuteOptions, FileOutcome, Outcome};
pub use config::{app_paths, load_config, save_config, AppConfig, AppPaths};
pub use numeral::{format_number, NumeralError, NumeralStyle};
pub use planner::{
    generate_plan, PlanError, PlanOptions, RenameCandidate, RenamePlan, RenameStats,
};
pub use sort::{compare_names, sort_files, CaseMode, OrderMode, SortPolicy};
pub use source::SourceFile;
pub use template::{
    compile_template, render_template, validate_template, FileToken, TemplateError, TemplatePart,
};
