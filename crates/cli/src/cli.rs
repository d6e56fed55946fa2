// src/cli.rs
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// gitdeps - A git dependency manager
///
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct ClapCli {
    /// Override the package store file from config
    ///
    #[clap(long, short = 's', global = true)]
    pub(crate) store_path: Option<PathBuf>,

    /// Override the dependency manifest from config
    ///
    #[clap(long, short = 'm', global = true)]
    pub(crate) manifest_path: Option<PathBuf>,

    /// Show detailed output
    ///
    #[clap(long, short = 'v', global = true, default_value_t = false)]
    pub(crate) verbose: bool,

    /// Disable colored output
    ///
    #[clap(long, global = true, default_value_t = false)]
    pub(crate) no_color: bool,

    /// Subcommand to execute
    ///
    #[clap(subcommand)]
    pub(crate) command: ClapCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum ClapCommands {
    /// Manage and install packages
    ///
    Package(PackageCommands),

    /// Manage package categories
    ///
    Category(CategoryCommands),

    /// Validate configuration, export and import packages
    ///
    Config(ConfigCommands),

    /// Inspect dependency specifiers
    ///
    Specifier(SpecifierCommands),

    /// View or hand edit the dependency manifest
    ///
    Manifest(ManifestCommands),
}

#[derive(Args, Debug, Clone)]
pub(crate) struct PackageCommands {
    #[clap(subcommand)]
    pub(crate) command: PackageSubcommands,
}

/// Optional descriptor fields shared by `add` and `edit`
#[derive(Args, Debug, Clone, Default)]
pub(crate) struct DescriptorFields {
    /// Human readable name
    #[clap(long)]
    pub(crate) display_name: Option<String>,

    #[clap(long)]
    pub(crate) description: Option<String>,

    #[clap(long)]
    pub(crate) version: Option<String>,

    /// Category to file the package under
    #[clap(long, short = 'c')]
    pub(crate) category: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum PackageSubcommands {
    /// List stored packages
    List {
        /// Only show packages in this category
        #[clap(long, short = 'c')]
        category: Option<String>,

        /// Only show packages whose name, identifier or description contains this text
        #[clap(long, short = 'q')]
        search: Option<String>,
    },

    /// Add a package to the store
    Add {
        /// Unique identifier, e.g. `com.owner.tool`
        identifier: String,

        /// Repository URL
        #[clap(long)]
        url: String,

        /// Subdirectory of the repository holding the package
        #[clap(long)]
        path: Option<String>,

        /// Branch, tag or commit
        #[clap(long, short = 'r')]
        revision: Option<String>,

        #[clap(flatten)]
        fields: DescriptorFields,
    },

    /// Add a package from a repository URL, deriving its identifier
    AddUrl {
        /// Repository URL, optionally carrying `?path=` and `#revision`
        url: String,

        /// Identifier to use instead of the derived one
        #[clap(long)]
        id: Option<String>,

        /// Subdirectory, overriding any `?path=` in the URL
        #[clap(long)]
        path: Option<String>,

        /// Revision, overriding any `#revision` in the URL
        #[clap(long, short = 'r')]
        revision: Option<String>,

        #[clap(long, short = 'c')]
        category: Option<String>,

        /// Install the package right away
        #[clap(long, default_value_t = false)]
        install: bool,
    },

    /// Add a package from a folder containing a package.json
    AddLocal {
        dir: PathBuf,

        #[clap(long, short = 'c')]
        category: Option<String>,

        /// Install the package right away
        #[clap(long, default_value_t = false)]
        install: bool,
    },

    /// Change fields of a stored package
    Edit {
        identifier: String,

        #[clap(long)]
        url: Option<String>,

        #[clap(long)]
        path: Option<String>,

        #[clap(long, short = 'r')]
        revision: Option<String>,

        #[clap(flatten)]
        fields: DescriptorFields,
    },

    /// Delete a package from the store (it stays installed)
    Delete {
        identifier: String,

        /// Do not ask for confirmation
        #[clap(long, short = 'y', default_value_t = false)]
        yes: bool,
    },

    /// Install a stored package
    Install { identifier: String },

    /// Uninstall a package
    Remove { identifier: String },

    /// Ask the backend what is installed and update the store
    Refresh,

    /// Show git packages found in the manifest
    Scan {
        /// Add detected packages that are not yet stored
        #[clap(long, default_value_t = false)]
        import: bool,
    },

    /// Validate stored packages
    Validate {
        /// Only validate this package
        identifier: Option<String>,
    },
}

#[derive(Args, Debug, Clone)]
pub(crate) struct CategoryCommands {
    #[clap(subcommand)]
    pub(crate) command: CategorySubcommands,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum CategorySubcommands {
    /// List categories with their package counts
    List,

    /// Create a category
    Add { name: String },

    /// Delete a category, moving its packages to the fallback category
    Delete { name: String },
}

#[derive(Args, Debug, Clone)]
pub(crate) struct ConfigCommands {
    #[clap(subcommand)]
    pub(crate) command: ConfigSubcommands,
}

/// What to do when an imported package is already stored
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum OnConflict {
    /// Ask for each conflicting package
    #[default]
    Ask,
    /// Replace stored packages
    Update,
    /// Keep stored packages
    Skip,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum ConfigSubcommands {
    /// Validate the gitdeps configuration
    Validate,

    /// Export packages to a JSON file
    Export {
        file: PathBuf,

        /// Only export these packages (repeatable)
        #[clap(long = "package", short = 'p')]
        packages: Vec<String>,
    },

    /// Import packages from a JSON export file
    Import {
        file: PathBuf,

        #[clap(long, value_enum, default_value_t = OnConflict::Ask)]
        on_conflict: OnConflict,
    },
}

#[derive(Args, Debug, Clone)]
pub(crate) struct SpecifierCommands {
    #[clap(subcommand)]
    pub(crate) command: SpecifierSubcommands,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum SpecifierSubcommands {
    /// Split a specifier into URL, subdirectory and revision
    Decode { specifier: String },
}

#[derive(Args, Debug, Clone)]
pub(crate) struct ManifestCommands {
    #[clap(subcommand)]
    pub(crate) command: ManifestSubcommands,
}

#[derive(Subcommand, Debug, Clone)]
pub(crate) enum ManifestSubcommands {
    /// Print the manifest path and its contents
    Show,

    /// Replace the manifest, from a file or in $EDITOR
    ///
    /// The new text must be a JSON object with a "dependencies" object,
    /// otherwise the manifest is left as it was.
    Edit {
        /// Take the new manifest from this file instead of opening an editor
        file: Option<PathBuf>,
    },
}
