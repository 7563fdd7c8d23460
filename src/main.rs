use recon_dataset_builder::{run_pipeline, DatasetConfig};

fn main() {
    let config = DatasetConfig::default();

    match run_pipeline(&config) {
        Ok(dataset) => {
            println!(
                "Synthetic dataset generated under: {}",
                config.root_output_dir.display()
            );
            println!(
                "  {} documents, {} bank transactions, {} ground-truth links",
                dataset.invoice_headers.len() + dataset.receipt_headers.len(),
                dataset.bank_transactions.len(),
                dataset.links.len()
            );
        }
        Err(err) => {
            eprintln!("dataset generation failed: {err}");
            std::process::exit(1);
        }
    }
}
