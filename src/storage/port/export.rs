use std::path::PathBuf;

use super::*;
use chrono::Local;
use csv::WriterBuilder;
use tracing::info;

const TEXT_TITLE: &str = "CONTACT LIST EXPORT";

pub fn export_contacts(
    contacts: &[Contact],
    des: Option<&Path>,
    format: ExportFormat,
    export_dir: &Path,
) -> Result<(PathBuf, usize), AppError> {
    let file_path = resolve_export_path(des, format, export_dir)?;
    create_file_parent(&file_path)?;

    match format {
        ExportFormat::Csv => write_csv(&file_path, contacts)?,
        ExportFormat::Txt => fs::write(&file_path, render_text(contacts))?,
        ExportFormat::Json => write_json_contacts(&file_path, contacts)?,
    }

    info!(path = %file_path.display(), count = contacts.len(), ?format, "contacts exported");
    Ok((file_path, contacts.len()))
}

fn default_file_name(format: ExportFormat) -> String {
    format!(
        "{EXPORT_PREFIX}{}.{}",
        Local::now().format("%Y%m%d_%H%M%S"),
        format.extension()
    )
}

fn resolve_export_path(
    des: Option<&Path>,
    format: ExportFormat,
    export_dir: &Path,
) -> Result<PathBuf, AppError> {
    let Some(path) = des else {
        return Ok(export_dir.join(default_file_name(format)));
    };

    if path.is_dir() {
        return Ok(path.join(default_file_name(format)));
    }

    match path.extension() {
        None => Ok(path.with_extension(format.extension())),
        Some(ext) if ext.eq_ignore_ascii_case(format.extension()) => Ok(path.to_path_buf()),
        Some(_) => Err(AppError::Validation(format!(
            "Export file must be a .{} file",
            format.extension()
        ))),
    }
}

fn write_csv(path: &Path, contacts: &[Contact]) -> Result<(), AppError> {
    // Header is written by hand so an empty book still exports one
    let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(CSV_HEADERS)?;

    for contact in contacts {
        writer.serialize(contact)?;
    }

    writer.flush()?;
    Ok(())
}

pub fn render_text(contacts: &[Contact]) -> String {
    let mut data = String::new();
    data.push_str(TEXT_TITLE);
    data.push('\n');
    data.push_str(&"=".repeat(50));
    data.push_str("\n\n");

    for (i, contact) in contacts.iter().enumerate() {
        data.push_str(&format!("Contact {}:\n", i + 1));
        data.push_str(&contact.details());
        data.push('\n');
        data.push_str(&"-".repeat(40));
        data.push_str("\n\n");
    }
    data
}
