//! Scaffolding for a research project synced to a remote server with rsync.

pub mod command;

use std::fs;
use std::path::Path;

use anyhow::bail;
use anyhow::Context;
use tracing::info;

/// The default remote server.
pub const DEFAULT_REMOTE: &str = "barnacle";

const RSYNC_IE: &str = "
# Set of include/exclude rules, for more information see 'man rsync'

# Exclude all objectfiles anywhere
- *.o
# Exclude all dot-files
- .*
# Exclude all dot-directories
- .*/

# Include the directories we want to sync
+ /
+ /rsync.ie
+ /Makefile
+ /Snakefile
+ /readme*
+ /config*
+ /*.json
- /*/*untrimmed*
+ /scripts/
# double asterisks is for both / and other char to include subdir
+ /scripts/**

# Exclude all the files
- *
";

const GITIGNORE: &str = "
# Ignore everything
/*

# But not these files...
!.gitignore
!Makefile
!rsync.ie
!README*
!readme*
!scripts/*
!Snakefile
";

/// The sub-directories of every project.
pub const SUBDIRS: [&str; 3] = ["doc", "data", "scripts"];

/// Renders the Makefile with `push`/`pull` targets (dry runs) and their
/// `_real` counterparts. `REMOTE` and `DIR` can be overridden from the
/// command line.
pub fn makefile(remote: &str, dir: &str) -> String {
    format!(
        "
####### variables to config #########
# define the remote server you wanna sync to.
# you can also pass this from cmd line: make push REMOTE=phelps
REMOTE ?= {remote}
# define the dir in remote server you wanna sync.
# you can also pass this from cmd line: make push DIR=ibd
DIR ?= {dir}
# define the max file size your wanna sync.
# you can leave this as empty.
SIZE = 100m
# define the file name containing the include/exclude patterns.
# you can leave this as empty
FILE = rsync.ie


# size filter
ifeq ($(SIZE),)
    SIZE_FILTER =
else
    SIZE_FILTER = --max-size=$(SIZE)
endif

# check if you have the exclude file
ifeq ($(wildcard $(FILE)),)
    FILE_FILTER =
else
    FILE_FILTER = --filter '. $(FILE)'
endif

FLAGS = -avuhzi --prune-empty-dirs -e ssh

pull:
\trsync $(FLAGS) $(FILE_FILTER) $(SIZE_FILTER) -n $(REMOTE):$(DIR)/ .
push:
\trsync $(FLAGS) -n . $(REMOTE):$(DIR)/

pull_real:
\trsync $(FLAGS) $(FILE_FILTER) $(SIZE_FILTER) $(REMOTE):$(DIR)/ .
push_real:
\trsync $(FLAGS) . $(REMOTE):$(DIR)/
",
        remote = remote,
        dir = dir
    )
}

/// Creates a new project directory at `dir`. An existing path is an error.
pub fn create_research_project<P>(dir: P, remote: &str) -> anyhow::Result<()>
where
    P: AsRef<Path>,
{
    let dir = dir.as_ref();
    if dir.exists() {
        bail!("project directory already exists: {}", dir.display());
    }

    write_project_files(dir, remote)
}

/// Writes the project files into `dir`, creating it and its sub-directories
/// when needed. Existing project files are replaced.
pub fn write_project_files(dir: &Path, remote: &str) -> anyhow::Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating directory: {}", dir.display()))?;

    let files = [
        ("Makefile", makefile(remote, &dir.display().to_string())),
        ("rsync.ie", RSYNC_IE.to_string()),
        (".gitignore", GITIGNORE.to_string()),
    ];

    for (name, contents) in files {
        let path = dir.join(name);
        fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
    }

    for name in SUBDIRS {
        let path = dir.join(name);
        fs::create_dir_all(&path)
            .with_context(|| format!("creating directory: {}", path.display()))?;
    }

    info!("Created project in {}", dir.display());
    Ok(())
}
