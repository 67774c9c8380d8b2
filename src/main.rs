use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    // An optional STL path on the command line joins the scene as an extra
    // showcase model.
    let model_path = std::env::args().nth(1).map(PathBuf::from);
    portico::run(model_path)?;
    Ok(())
}
