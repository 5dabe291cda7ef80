use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::settings::{load_settings, save_settings};

pub fn run(data_dir: Option<String>, profile: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        settings.data_dir = dir;
    }
    if profile.is_some() {
        settings.profile = profile;
    }

    std::fs::create_dir_all(&settings.data_dir)?;
    let db_path = settings.db_path();
    let conn = get_connection(&db_path)?;
    init_db(&conn)?;
    save_settings(&settings)?;

    println!("Initialized database at {}", db_path.display());
    if let Some(profile) = &settings.profile {
        println!("Active profile: {profile}");
    }
    Ok(())
}
