//! Void Engine Editor
//!
//! Opens a project, brings its asset database up to date and optionally
//! keeps it in sync with the resource directory.

use void_editor::{CliArgs, EditorPreferences, EditorResult, Project};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match CliArgs::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };
    if args.help {
        println!("{}", void_editor::cli::USAGE);
        return;
    }

    if let Err(e) = run(&args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &CliArgs) -> EditorResult<()> {
    let prefs_path = EditorPreferences::default_path();
    let mut prefs = match &prefs_path {
        Some(path) => EditorPreferences::load(path).unwrap_or_else(|e| {
            log::warn!("Ignoring preferences: {}", e);
            EditorPreferences::default()
        }),
        None => EditorPreferences::default(),
    };

    let mut project = Project::open(&args.project)?;
    let import = args.import || prefs.auto_import;
    let report = project.refresh(import)?;
    log::info!("{}: {}", project.name(), report);

    let db = project.database();
    let dirty = db.assets().filter(|a| a.is_dirty()).count();
    println!("{} assets, {} dirty", db.len(), dirty);

    prefs.add_recent_project(project.root());
    if let Some(path) = &prefs_path {
        if let Err(e) = prefs.save(path) {
            log::warn!("Could not save preferences: {}", e);
        }
    }

    if args.watch {
        watch(&mut project, import, prefs.watch_debounce_ms)?;
    }
    Ok(())
}

#[cfg(feature = "watch")]
fn watch(project: &mut Project, import: bool, debounce_ms: u64) -> EditorResult<()> {
    use std::time::Duration;
    use void_asset::ResourceWatcher;

    let extension = project.database().config().sidecar_extension.clone();
    let mut watcher = ResourceWatcher::new(project.resource_path(), &extension)?;
    watcher.set_debounce(Duration::from_millis(debounce_ms));
    log::info!("Watching {:?}", watcher.root());

    loop {
        let changes = watcher.wait(Duration::from_millis(500));
        if changes.is_empty() {
            continue;
        }
        log::debug!("{} change(s) detected", changes.len());

        // A failed rescan is reported; the next change retries it
        match project.refresh(import) {
            Ok(report) if report.is_structurally_unchanged() && report.changed == 0 && report.imported == 0 => {}
            Ok(report) => log::info!("{}", report),
            Err(e) => log::error!("Rescan failed: {}", e),
        }
    }
}

#[cfg(not(feature = "watch"))]
fn watch(_project: &mut Project, _import: bool, _debounce_ms: u64) -> EditorResult<()> {
    Err(void_editor::EditorError::Usage("built without file watching support".into()))
}
