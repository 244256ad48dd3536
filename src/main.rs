//! embed-host - CLI

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use embed_host::locate::{LocateReport, Platform};
use embed_host::util::config::{load_config, HostConfig};
use embed_host::util::logger::{self, LogLevel};
use embed_host::{run, Scenario, NAME, VERSION};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;

/// Call into managed code through a GraalVM isolate and through JNI
#[derive(Parser, Debug)]
#[command(name = "embed-host")]
#[command(version = VERSION)]
#[command(about = "Call into managed code through a GraalVM isolate and through JNI", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Configuration file (default: ./embed-host.toml, then the user config)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the isolate scenario, then the JNI scenario (default)
    All {
        #[command(flatten)]
        isolate: IsolateArgs,
        #[command(flatten)]
        jni: JniArgs,
    },

    /// Run only the GraalVM isolate scenario
    Isolate {
        #[command(flatten)]
        isolate: IsolateArgs,
    },

    /// Run only the JNI scenario
    Jni {
        #[command(flatten)]
        jni: JniArgs,
    },

    /// Print the platform and the libraries that would be loaded
    Locate,

    /// Print version information
    Version,
}

#[derive(clap::Args, Debug, Default)]
struct IsolateArgs {
    /// Native-image shared library
    #[arg(long, value_name = "PATH")]
    library: Option<PathBuf>,

    /// Exported entry point to call
    #[arg(long, value_name = "SYMBOL")]
    entry: Option<String>,
}

impl IsolateArgs {
    fn apply(
        self,
        config: &mut HostConfig,
    ) {
        if let Some(library) = self.library {
            config.isolate.library = Some(library);
        }
        if let Some(entry) = self.entry {
            config.isolate.entry_point = entry;
        }
    }
}

#[derive(clap::Args, Debug, Default)]
struct JniArgs {
    /// libjvm to load instead of searching the Java home
    #[arg(long, value_name = "PATH")]
    jvm_lib: Option<PathBuf>,

    /// Java home to search for libjvm
    #[arg(long, value_name = "DIR")]
    java_home: Option<PathBuf>,

    /// Class to instantiate
    #[arg(long, value_name = "NAME")]
    class: Option<String>,

    /// No-argument void method to call
    #[arg(long, value_name = "NAME")]
    method: Option<String>,

    /// Class path entry (repeatable)
    #[arg(long = "class-path", value_name = "PATH")]
    class_path: Vec<PathBuf>,

    /// Extra JVM option, e.g. -J-Xmx256m (repeatable)
    #[arg(short = 'J', value_name = "OPTION", allow_hyphen_values = true)]
    jvm_option: Vec<String>,
}

impl JniArgs {
    fn apply(
        self,
        config: &mut HostConfig,
    ) {
        if let Some(library) = self.jvm_lib {
            config.jvm.library = Some(library);
        }
        if let Some(home) = self.java_home {
            config.jvm.java_home = Some(home);
        }
        if let Some(class) = self.class {
            config.jvm.class = class;
        }
        if let Some(method) = self.method {
            config.jvm.method = method;
        }
        if !self.class_path.is_empty() {
            config.jvm.class_path = self.class_path;
        }
        config.jvm.options.extend(self.jvm_option);
    }
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let cwd = std::env::current_dir().context("Failed to determine working directory")?;
    let loaded = load_config(args.config.as_deref(), &cwd).context("Failed to load configuration")?;
    let mut config = loaded.config;
    config.apply_process_env();

    let level = if args.verbose {
        LogLevel::Debug
    } else if args.quiet {
        LogLevel::Error
    } else {
        config.log.level.unwrap_or_default()
    };
    logger::init_with_level(level);

    debug!("{} {} on {}", NAME, VERSION, std::env::consts::OS);
    debug!("configuration source: {:?}", loaded.source);

    let command = args.command.unwrap_or(Commands::All {
        isolate: IsolateArgs::default(),
        jni: JniArgs::default(),
    });

    let scenario = match command {
        Commands::All { isolate, jni } => {
            isolate.apply(&mut config);
            jni.apply(&mut config);
            Scenario::All
        }
        Commands::Isolate { isolate } => {
            isolate.apply(&mut config);
            Scenario::Isolate
        }
        Commands::Jni { jni } => {
            jni.apply(&mut config);
            Scenario::Jni
        }
        Commands::Locate => {
            let platform = Platform::current()?;
            println!("{}", LocateReport::new(&config.isolate, &config.jvm, &cwd, platform));
            return Ok(ExitCode::SUCCESS);
        }
        Commands::Version => {
            println!("{} {}", NAME, VERSION);
            return Ok(ExitCode::SUCCESS);
        }
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    match run(&config, scenario, &cwd, &mut out) {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => Ok(ExitCode::from(err.exit_code())),
    }
}
