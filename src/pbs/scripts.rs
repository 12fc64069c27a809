//! Per-sample scripts for the tools that can be run as job arrays.

use std::path::Path;
use std::path::PathBuf;

use anyhow::bail;

use crate::pbs::resources::Resources;
use crate::pbs::template::render;
use crate::pbs::template::set;
use crate::pbs::SampleRow;

const DONE: &str = "echo \"DONE $(date)\"";

/// Where the inputs and outputs of a job array live.
pub struct ArrayDirs<'a> {
    /// Directory holding the raw input files named in the metadata.
    pub raw_dir: &'a Path,

    /// Directory the outputs and per-sample scripts are written to.
    pub out_dir: &'a Path,
}

/// Builds the script a job array runs for one sample.
pub trait ScriptBuilder {
    /// The tool name, used as the default job name.
    fn name(&self) -> &str;

    /// Where the script for `sample_id` is written.
    fn script_path(&self, dirs: &ArrayDirs<'_>, sample_id: &str) -> PathBuf;

    /// Renders the script for one sample.
    fn create_cmd(
        &self,
        row: &SampleRow<'_>,
        dirs: &ArrayDirs<'_>,
        resources: &Resources,
    ) -> anyhow::Result<String>;
}

fn join_paths(dir: &Path, files: &[&str]) -> String {
    files
        .iter()
        .map(|f| dir.join(f).display().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

//=========//
// HUMAnN2 //
//=========//

/// Functional profiling with HUMAnN2. A sample with several input files has
/// them concatenated into a temporary file first.
pub struct Humann2 {
    /// Metadata columns naming the input files.
    pub input_columns: Vec<String>,

    /// Lines run before the tool.
    pub prolog: String,

    /// Lines run after the tool.
    pub epilog: String,
}

impl Humann2 {
    /// Creates a builder reading inputs from `input_columns`.
    pub fn new(input_columns: Vec<String>) -> Self {
        Self {
            input_columns,
            prolog: String::from("humann2_config --print"),
            epilog: String::from(DONE),
        }
    }
}

impl ScriptBuilder for Humann2 {
    fn name(&self) -> &str {
        "humann2"
    }

    fn script_path(&self, dirs: &ArrayDirs<'_>, sample_id: &str) -> PathBuf {
        dirs.out_dir
            .join(sample_id)
            .join(format!("{}.sh", self.name()))
    }

    fn create_cmd(
        &self,
        row: &SampleRow<'_>,
        dirs: &ArrayDirs<'_>,
        resources: &Resources,
    ) -> anyhow::Result<String> {
        let sid = row.id();
        let inputs = row.present(&self.input_columns)?;
        let sample_dir = dirs.out_dir.join(sid);

        let mut vars = resources.vars(self.name());
        set(&mut vars, "out_dir", sample_dir.display());
        set(&mut vars, "input", join_paths(dirs.raw_dir, &inputs));

        let template = match inputs.len() {
            0 => bail!("no input files for sample: {}", sid),
            1 => {
                "if ! ls {out_dir}/*.tsv &> /dev/null ; then
    humann2 --input {input} --output {out_dir} --threads {ppn}
fi
"
            }
            _ => {
                set(
                    &mut vars,
                    "tmp",
                    sample_dir.join(format!("{}.fastq", sid)).display(),
                );
                "if ! ls {out_dir}/*.tsv &> /dev/null ; then
    zless {input} >> {tmp} && humann2 --input {tmp} --output {out_dir} --threads {ppn} && rm -f {tmp}
fi
"
            }
        };

        let script = [self.prolog.as_str(), template, self.epilog.as_str()].join("\n");
        Ok(render(&script, &vars)?)
    }
}

//========//
// Kraken //
//========//

/// How the reads of a sample are laid out in the metadata.
pub enum KrakenInput {
    /// Single-end reads from any number of columns.
    Single(Vec<String>),

    /// Paired-end reads. Each mate may be spread over several columns, in
    /// which case the files are concatenated first.
    Paired {
        /// Columns holding the first mates.
        r1: Vec<String>,

        /// Columns holding the second mates.
        r2: Vec<String>,
    },
}

/// The compression of the input reads.
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Compression {
    /// gzip compressed reads.
    Gzip,

    /// bzip2 compressed reads.
    Bzip2,
}

/// Taxonomic classification with Kraken.
pub struct Kraken {
    /// The reads of each sample.
    pub input: KrakenInput,

    /// The Kraken database.
    pub db: String,

    /// The compression of the reads, if any.
    pub compression: Option<Compression>,

    /// Whether the reads are FASTQ rather than FASTA.
    pub fastq: bool,

    /// Lines run before the tool.
    pub prolog: String,

    /// Lines run after the tool.
    pub epilog: String,
}

impl Kraken {
    /// Creates a builder for FASTQ reads against `db`.
    pub fn new(input: KrakenInput, db: impl Into<String>) -> Self {
        Self {
            input,
            db: db.into(),
            compression: None,
            fastq: true,
            prolog: String::new(),
            epilog: String::from(DONE),
        }
    }
}

impl ScriptBuilder for Kraken {
    fn name(&self) -> &str {
        "kraken"
    }

    fn script_path(&self, dirs: &ArrayDirs<'_>, sample_id: &str) -> PathBuf {
        dirs.out_dir.join(format!("{}.sh", sample_id))
    }

    fn create_cmd(
        &self,
        row: &SampleRow<'_>,
        dirs: &ArrayDirs<'_>,
        resources: &Resources,
    ) -> anyhow::Result<String> {
        let sid = row.id();

        let mut vars = resources.vars(self.name());
        set(&mut vars, "sid", sid);
        set(&mut vars, "db", &self.db);
        set(&mut vars, "out", dirs.out_dir.join(sid).display());
        set(&mut vars, "out_dir", dirs.out_dir.display());

        let mut lines = vec![String::from(
            "if ! ls {out_dir}/{sid}.kraken &> /dev/null ; then",
        )];

        let mut cmd = vec!["kraken", "--preload", "-db {db}"];

        match &self.input {
            KrakenInput::Single(columns) => {
                let inputs = row.present(columns)?;
                if inputs.is_empty() {
                    bail!("no input files for sample: {}", sid);
                }
                set(&mut vars, "input", join_paths(dirs.raw_dir, &inputs));
                cmd.extend(["{input}", "--output {out}", "--threads {ppn}"]);
            }
            KrakenInput::Paired { r1, r2 } => {
                for (mate, columns) in [("R1", r1), ("R2", r2)] {
                    let inputs = row.present(columns)?;
                    let path = match inputs.as_slice() {
                        [] => bail!("no {} files for sample: {}", mate, sid),
                        [single] => dirs.raw_dir.join(single),
                        _ => {
                            let concatenated = dirs.out_dir.join(format!("{}.{}", mate, sid));
                            set(
                                &mut vars,
                                &format!("{}_inputs", mate),
                                join_paths(dirs.raw_dir, &inputs),
                            );
                            lines.push(format!("    zless {{{0}_inputs}} >> {{{0}}}", mate));
                            concatenated
                        }
                    };
                    set(&mut vars, mate, path.display());
                }
                cmd.extend([
                    "--paired {R1} {R2}",
                    "--output {out}",
                    "--threads {ppn}",
                    "--check-names",
                ]);
            }
        }

        if self.fastq {
            cmd.push("--fastq-input");
        }

        match self.compression {
            Some(Compression::Gzip) => cmd.push("--gzip-compressed"),
            Some(Compression::Bzip2) => cmd.push("--bzip2-compressed"),
            None => {}
        }

        lines.push(format!("    {}", cmd.join(" ")));
        lines.push(String::from(
            "    kraken-translate --db {db} --mpa-format {out} > {out}.kraken",
        ));
        lines.push(String::from("fi"));

        let script = [self.prolog.clone(), lines.join("\n"), self.epilog.clone()].join("\n");
        Ok(render(&script, &vars)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::formats::tsv::LabelledTable;

    fn metadata() -> LabelledTable {
        LabelledTable::from_reader(
            "id\tR1\tR2\tR1b\ns1\ta_1.fq\ta_2.fq\t\ns2\tb_1.fq\tb_2.fq\tc_1.fq\ns3\t\t\t\n".as_bytes(),
        )
        .unwrap()
    }

    fn dirs() -> ArrayDirs<'static> {
        ArrayDirs {
            raw_dir: Path::new("raw"),
            out_dir: Path::new("out"),
        }
    }

    #[test]
    fn test_humann2_single_input() {
        let table = metadata();
        let row = SampleRow::all(&table).next().unwrap();
        let builder = Humann2::new(vec!["R1".to_string(), "R1b".to_string()]);

        let script = builder
            .create_cmd(&row, &dirs(), &Resources::default())
            .unwrap();
        assert_eq!(
            script,
            "humann2_config --print
if ! ls out/s1/*.tsv &> /dev/null ; then
    humann2 --input raw/a_1.fq --output out/s1 --threads 32
fi

echo \"DONE $(date)\""
        );
        assert_eq!(
            builder.script_path(&dirs(), "s1"),
            PathBuf::from("out/s1/humann2.sh")
        );
    }

    #[test]
    fn test_humann2_concatenates_inputs() {
        let table = metadata();
        let row = SampleRow::all(&table).nth(1).unwrap();
        let builder = Humann2::new(vec!["R1".to_string(), "R1b".to_string()]);

        let script = builder
            .create_cmd(&row, &dirs(), &Resources::default())
            .unwrap();
        assert!(script.contains(
            "zless raw/b_1.fq raw/c_1.fq >> out/s2/s2.fastq && humann2 --input out/s2/s2.fastq"
        ));
    }

    #[test]
    fn test_humann2_without_inputs() {
        let table = metadata();
        let row = SampleRow::all(&table).nth(2).unwrap();
        let builder = Humann2::new(vec!["R1".to_string()]);
        assert!(builder
            .create_cmd(&row, &dirs(), &Resources::default())
            .is_err());
    }

    #[test]
    fn test_kraken_paired() {
        let table = metadata();
        let row = SampleRow::all(&table).nth(1).unwrap();
        let mut builder = Kraken::new(
            KrakenInput::Paired {
                r1: vec!["R1".to_string(), "R1b".to_string()],
                r2: vec!["R2".to_string()],
            },
            "db",
        );
        builder.compression = Some(Compression::Gzip);

        let script = builder
            .create_cmd(&row, &dirs(), &Resources::default())
            .unwrap();
        let lines: Vec<&str> = script.lines().collect();

        assert_eq!(lines[1], "if ! ls out/s2.kraken &> /dev/null ; then");
        assert_eq!(lines[2], "    zless raw/b_1.fq raw/c_1.fq >> out/R1.s2");
        assert_eq!(
            lines[3],
            "    kraken --preload -db db --paired out/R1.s2 raw/b_2.fq --output out/s2 \
             --threads 32 --check-names --fastq-input --gzip-compressed"
        );
        assert_eq!(
            lines[4],
            "    kraken-translate --db db --mpa-format out/s2 > out/s2.kraken"
        );
    }

    #[test]
    fn test_kraken_single() {
        let table = metadata();
        let row = SampleRow::all(&table).next().unwrap();
        let mut builder = Kraken::new(KrakenInput::Single(vec!["R1".to_string()]), "db");
        builder.fastq = false;

        let script = builder
            .create_cmd(&row, &dirs(), &Resources::default())
            .unwrap();
        assert!(script
            .contains("    kraken --preload -db db raw/a_1.fq --output out/s1 --threads 32\n"));
    }
}
