//! Writing job-array launcher scripts.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use tracing::debug;
use tracing::info;

use crate::pbs::resources::Resources;
use crate::pbs::scripts::ArrayDirs;
use crate::pbs::scripts::ScriptBuilder;
use crate::pbs::template::render;
use crate::pbs::template::set;
use crate::pbs::template::Vars;
use crate::pbs::SampleRow;
use crate::utils::formats::tsv::LabelledTable;

/// The header variables for an array over `rows` samples. `total` is the last
/// array index.
fn header_vars(resources: &Resources, default_name: &str, rows: usize) -> Vars {
    let mut vars = resources.vars(default_name);
    set(&mut vars, "total", rows.saturating_sub(1));
    vars
}

/// A job array running one tool over every sample of a metadata table.
pub struct JobArray<'a> {
    /// One row per sample.
    pub metadata: &'a LabelledTable,

    /// Builds the script for each sample.
    pub builder: &'a dyn ScriptBuilder,

    /// Resources requested for each job.
    pub resources: Resources,

    /// Header template. Defaults to [`Resources::header`].
    pub header: Option<String>,
}

impl<'a> JobArray<'a> {
    /// Creates a job array with the default header.
    pub fn new(
        metadata: &'a LabelledTable,
        builder: &'a dyn ScriptBuilder,
        resources: Resources,
    ) -> Self {
        Self {
            metadata,
            builder,
            resources,
            header: None,
        }
    }

    /// Writes one script per sample under `dirs.out_dir` and the launcher to
    /// `out`. Returns the paths of the per-sample scripts.
    pub fn create<W>(&self, dirs: &ArrayDirs<'_>, mut out: W) -> anyhow::Result<Vec<PathBuf>>
    where
        W: Write,
    {
        fs::create_dir_all(dirs.out_dir)
            .with_context(|| format!("creating directory: {}", dirs.out_dir.display()))?;

        let header = self
            .header
            .clone()
            .unwrap_or_else(|| self.resources.header());
        let vars = header_vars(
            &self.resources,
            self.builder.name(),
            self.metadata.row_ids.len(),
        );
        out.write_all(render(&header, &vars)?.as_bytes())?;

        writeln!(out, "scripts=(")?;
        let mut scripts = Vec::new();

        for (i, row) in SampleRow::all(self.metadata).enumerate() {
            let body = self
                .builder
                .create_cmd(&row, dirs, &self.resources)
                .with_context(|| format!("creating script for sample: {}", row.id()))?;
            let path = self.builder.script_path(dirs, row.id());
            write_script(&path, &body)?;
            debug!("Wrote {}", path.display());

            writeln!(out, "\"{}\"  # {}", path.display(), i + 1)?;
            scripts.push(path);
        }

        writeln!(out, ")")?;
        writeln!(out, "bash ${{scripts[$PBS_ARRAYID]}}")?;

        info!("Created {} {} scripts.", scripts.len(), self.builder.name());
        Ok(scripts)
    }
}

fn write_script(path: &Path, body: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating directory: {}", parent.display()))?;
    }
    fs::write(path, body).with_context(|| format!("writing script: {}", path.display()))
}

/// Options for [`create_job_arrays`].
pub struct ArrayOptions<'a> {
    /// Column holding the sample id. The row id is used when absent.
    pub sid_column: Option<&'a str>,

    /// Directory holding the raw input files.
    pub raw_dir: &'a Path,

    /// File name (without `.pbs`) of each per-sample script.
    pub prefix: &'a str,

    /// Directory holding one sub-directory per sample.
    pub parent_dir: &'a Path,
}

/// Creates a sub-directory of `opts.parent_dir` for every sample holding a
/// `<prefix>.pbs` script rendered from `template`, and writes the launcher to
/// `out`.
///
/// The template can use every metadata column of the sample's row as well as
/// `sample`, `raw_dir`, `out` (the sample directory joined with the prefix)
/// and the resource variables.
pub fn create_job_arrays<W>(
    metadata: &LabelledTable,
    opts: &ArrayOptions<'_>,
    template: &str,
    resources: &Resources,
    mut out: W,
) -> anyhow::Result<Vec<PathBuf>>
where
    W: Write,
{
    let file_name = format!("{}.pbs", opts.prefix);

    let vars = header_vars(resources, opts.prefix, metadata.row_ids.len());
    out.write_all(render(&resources.header(), &vars)?.as_bytes())?;
    write!(out, "samples=(")?;

    fs::create_dir_all(opts.parent_dir)
        .with_context(|| format!("creating directory: {}", opts.parent_dir.display()))?;

    let mut scripts = Vec::new();

    for (i, row) in SampleRow::all(metadata).enumerate() {
        let sid = match opts.sid_column {
            Some(column) => row.get(column)?.with_context(|| {
                format!("missing {} for row: {}", column, row.id())
            })?,
            None => row.id(),
        };

        let dir = opts.parent_dir.join(sid);
        let mut vars = resources.vars(opts.prefix);
        for (column, value) in row.pairs() {
            set(&mut vars, column, value);
        }
        set(&mut vars, "sample", sid);
        set(&mut vars, "raw_dir", opts.raw_dir.display());
        set(&mut vars, "out", dir.join(opts.prefix).display());

        let body = render(template, &vars)
            .with_context(|| format!("rendering script for sample: {}", sid))?;
        let path = dir.join(&file_name);
        write_script(&path, &body)?;

        write!(out, "\n\"{}\"  #{}", sid, i)?;
        scripts.push(path);
    }

    writeln!(out, "\n)")?;
    writeln!(
        out,
        "bash {}",
        opts.parent_dir
            .join("${samples[${PBS_ARRAYID}]}")
            .join(&file_name)
            .display()
    )?;

    info!("Created {} job scripts.", scripts.len());
    Ok(scripts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pbs::scripts::KrakenInput;
    use crate::pbs::scripts::Kraken;

    fn metadata() -> LabelledTable {
        LabelledTable::from_reader("id\tone\ttwo\ns1\ta\t1\ns2\tb\t2\n".as_bytes()).unwrap()
    }

    #[test]
    fn test_job_array_launcher() {
        let dir = tempfile::tempdir().unwrap();
        let raw = dir.path().join("raw");
        let out_dir = dir.path().join("out");
        let dirs = ArrayDirs {
            raw_dir: &raw,
            out_dir: &out_dir,
        };

        let table = metadata();
        let builder = Kraken::new(KrakenInput::Single(vec!["one".to_string()]), "db");
        let array = JobArray::new(&table, &builder, Resources::default());

        let mut launcher = Vec::new();
        let scripts = array.create(&dirs, &mut launcher).unwrap();
        let launcher = String::from_utf8(launcher).unwrap();

        assert_eq!(scripts.len(), 2);
        assert!(scripts.iter().all(|s| s.exists()));
        assert!(launcher.contains("#PBS -t 0-1%10\n"));
        assert!(launcher.contains(&format!(
            "scripts=(\n\"{}\"  # 1\n\"{}\"  # 2\n)\n",
            out_dir.join("s1.sh").display(),
            out_dir.join("s2.sh").display()
        )));
        assert!(launcher.ends_with("bash ${scripts[$PBS_ARRAYID]}\n"));
    }

    #[test]
    fn test_create_job_arrays_from_template() {
        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().join("project");
        let opts = ArrayOptions {
            sid_column: None,
            raw_dir: Path::new("foo_run"),
            prefix: "run",
            parent_dir: &parent,
        };

        let table = metadata();
        let mut launcher = Vec::new();
        let scripts = create_job_arrays(
            &table,
            &opts,
            "humann2 {raw_dir}/{one} -t {ppn} -o {out}\n",
            &Resources::default(),
            &mut launcher,
        )
        .unwrap();

        assert_eq!(scripts[0], parent.join("s1").join("run.pbs"));
        let script = std::fs::read_to_string(&scripts[1]).unwrap();
        assert_eq!(
            script,
            format!(
                "humann2 foo_run/b -t 32 -o {}\n",
                parent.join("s2").join("run").display()
            )
        );

        let launcher = String::from_utf8(launcher).unwrap();
        assert!(launcher.contains("samples=(\n\"s1\"  #0\n\"s2\"  #1\n)\n"));
        assert!(launcher.contains("${samples[${PBS_ARRAYID}]}"));
    }

    #[test]
    fn test_unrealized_template_variable() {
        let dir = tempfile::tempdir().unwrap();
        let parent = dir.path().join("project");
        let opts = ArrayOptions {
            sid_column: Some("one"),
            raw_dir: Path::new("raw"),
            prefix: "run",
            parent_dir: &parent,
        };

        let result = create_job_arrays(
            &metadata(),
            &opts,
            "{missing}",
            &Resources::default(),
            Vec::new(),
        );
        assert!(result.is_err());
    }
}
