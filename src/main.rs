extern crate corella;

extern crate clap;
use clap::*;

#[macro_use]
extern crate log;

use corella::{DEFAULT_ANI_THRESHOLD, DEFAULT_KMER_LENGTH, DEFAULT_SKETCH_SIZE};

fn main() {
    let app = build_cli();
    let matches = app.get_matches();
    set_log_level(&matches);

    let fasta_path = matches.get_one::<String>("genome-fasta").unwrap();
    let kmer_length: usize = *matches.get_one::<usize>("kmer-length").unwrap();
    let sketch_size: usize = *matches.get_one::<usize>("sketch-size").unwrap();
    let threshold: f64 = *matches.get_one::<f64>("threshold").unwrap();
    let num_threads: Option<usize> = matches.get_one::<usize>("threads").copied();

    let seqs = match corella::fasta::read_sequences(fasta_path) {
        Ok(seqs) => seqs,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    info!("Read {} sequences from {}", seqs.len(), fasta_path);

    let clusters = match corella::minhash_clusterer::cluster_with_minhash_signatures(
        &seqs,
        kmer_length,
        sketch_size,
        threshold,
        num_threads,
    ) {
        Ok(clusters) => clusters,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    info!("Found {} clusters", clusters.len());

    for cluster in clusters {
        println!("{}", cluster.join("\t"));
    }
}

fn set_log_level(matches: &ArgMatches) {
    let mut level = log::LevelFilter::Info;
    if matches.get_flag("verbose") {
        level = log::LevelFilter::Debug;
    }
    if matches.get_flag("quiet") {
        level = log::LevelFilter::Error;
    }
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    if let Ok(env_filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&env_filters);
    }
    if builder.try_init().is_err() {
        panic!("Failed to set log level - has it been specified multiple times?")
    }
}

fn build_cli() -> Command {
    Command::new("corella")
        .version(crate_version!())
        .about("Cluster nucleotide sequences by MinHash similarity")
        .arg(
            Arg::new("genome-fasta")
                .long("genome-fasta")
                .short('f')
                .required(true)
                .help("FASTA file of sequences to cluster"),
        )
        .arg(
            Arg::new("kmer-length")
                .long("kmer-length")
                .short('k')
                .value_parser(value_parser!(usize))
                .default_value(DEFAULT_KMER_LENGTH)
                .help("K-mer length used for MinHash sketching"),
        )
        .arg(
            Arg::new("sketch-size")
                .long("sketch-size")
                .short('n')
                .value_parser(value_parser!(usize))
                .default_value(DEFAULT_SKETCH_SIZE)
                .help("Number of hash values per signature"),
        )
        .arg(
            Arg::new("threshold")
                .long("threshold")
                .value_parser(value_parser!(f64))
                .default_value(DEFAULT_ANI_THRESHOLD)
                .help(
                    "Maximum inter-cluster distance to merge clusters, as average \
                     nucleotide dissimilarity (1-ANI)",
                ),
        )
        .arg(
            Arg::new("threads")
                .long("threads")
                .short('t')
                .value_parser(value_parser!(usize))
                .help("Number of workers used to fill the distance matrix [default: min(CPUs, 8)]"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::SetTrue)
                .help("Print extra debugging information"),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .action(ArgAction::SetTrue)
                .help("Unless there is an error, do not print log messages"),
        )
}
