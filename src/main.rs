use letsdo::cli::run;
use letsdo::error::TaskError;

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        // Corrupt history or a failed write is an internal error; everything
        // else is the user's to fix.
        let internal = matches!(
            e.downcast_ref::<TaskError>(),
            Some(TaskError::HistoryFormat { .. }) | Some(TaskError::Io(_))
        );
        if internal {
            eprintln!("Internal error: {}", e);
            std::process::exit(2);
        } else {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
