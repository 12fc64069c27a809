//! PBS resource requests and the launcher header.

use clap::Args;

use crate::pbs::template::set;
use crate::pbs::template::Vars;

/// The resources requested for every job in an array.
#[derive(Args, Clone, Debug, PartialEq, Eq)]
pub struct Resources {
    /// Job name. Defaults to the name of the tool being run.
    #[arg(long = "job-name", value_name = "NAME")]
    pub name: Option<String>,

    /// Processors per node.
    #[arg(long, value_name = "USIZE", default_value = "32")]
    pub ppn: usize,

    /// Memory in gigabytes.
    #[arg(long, value_name = "GB", default_value = "32")]
    pub mem: usize,

    /// Wall time in hours.
    #[arg(long, value_name = "HOURS", default_value = "1000")]
    pub walltime: usize,

    /// Maximum number of jobs running at once.
    #[arg(long, value_name = "USIZE", default_value = "10")]
    pub runs: usize,

    /// Address notified when a job aborts, begins or ends.
    #[arg(long, value_name = "ADDRESS")]
    pub email: Option<String>,
}

impl Default for Resources {
    fn default() -> Self {
        Self {
            name: None,
            ppn: 32,
            mem: 32,
            walltime: 1000,
            runs: 10,
            email: None,
        }
    }
}

impl Resources {
    /// The template variables describing these resources. `default_name` is
    /// used when no job name was given.
    pub fn vars(&self, default_name: &str) -> Vars {
        let mut vars = Vars::new();
        set(
            &mut vars,
            "name",
            self.name.as_deref().unwrap_or(default_name),
        );
        set(&mut vars, "ppn", self.ppn);
        set(&mut vars, "mem", self.mem);
        set(&mut vars, "walltime", self.walltime);
        set(&mut vars, "runs", self.runs);
        if let Some(email) = &self.email {
            set(&mut vars, "email", email);
        }
        vars
    }

    /// The header template of a launcher script. The job array covers indices
    /// `0` through `{total}`.
    pub fn header(&self) -> String {
        let mut header = String::from(
            "#!/bin/bash

#PBS -V
#PBS -N {name}
#PBS -l nodes=1:ppn={ppn}
#PBS -l mem={mem}gb
#PBS -l walltime={walltime}:00:00

#PBS -t 0-{total}%{runs}

",
        );

        if self.email.is_some() {
            header.push_str(
                "#PBS -M {email}
# email when job aborts, begins or ends.
#PBS -m abe

",
            );
        }

        header.push_str(
            "# keep output in real time
#PBS -k oe
#PBS -o log/{name}.o$PBS_JOBID
#PBS -e log/{name}.e$PBS_JOBID

cd $PBS_O_WORKDIR

echo ------------------------------------------------------
echo PBS: qsub is running on $PBS_O_HOST
echo PBS: originating queue is $PBS_O_QUEUE
echo PBS: executing queue is $PBS_QUEUE
echo PBS: working directory is $PBS_O_WORKDIR
echo PBS: execution mode is $PBS_ENVIRONMENT
echo PBS: job identifier is $PBS_JOBID
echo PBS: job name is $PBS_JOBNAME
echo PBS: node file is $PBS_NODEFILE
echo PBS: current home directory is $PBS_O_HOME
echo PBS: PATH = $PBS_O_PATH
echo ------------------------------------------------------

",
        );

        header
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pbs::template::render;

    #[test]
    fn test_render_default_header() {
        let resources = Resources::default();
        let mut vars = resources.vars("kraken");
        set(&mut vars, "total", 4);

        let header = render(&resources.header(), &vars).unwrap();
        assert!(header.contains("#PBS -N kraken\n"));
        assert!(header.contains("#PBS -l nodes=1:ppn=32\n"));
        assert!(header.contains("#PBS -t 0-4%10\n"));
        assert!(header.contains("#PBS -o log/kraken.o$PBS_JOBID\n"));
        assert!(!header.contains("#PBS -M"));
    }

    #[test]
    fn test_header_with_email() {
        let resources = Resources {
            name: Some("job".to_string()),
            email: Some("me@example.org".to_string()),
            ..Default::default()
        };
        let mut vars = resources.vars("kraken");
        set(&mut vars, "total", 0);

        let header = render(&resources.header(), &vars).unwrap();
        assert!(header.contains("#PBS -N job\n"));
        assert!(header.contains("#PBS -M me@example.org\n#PBS -m abe\n"));
    }
}
