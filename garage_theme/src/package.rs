use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;
use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::read::ZipArchive;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::Error;
use crate::color::HexPolicy;
use crate::theme::ExtractedTheme;


pub const CONVENTIONAL_THEME_PATH: &str = "ppt/theme/theme1.xml";
pub(crate) const CONTENT_TYPES_PATH: &str = "[Content_Types].xml";


/// Picks the theme part among the member names of a package.
///
/// The conventional path wins; otherwise, the first name (in the order given) that mentions "theme" and
/// ends in `.xml` is taken.
pub fn locate_theme_member<'a, I: IntoIterator<Item = &'a str>>(member_names: I) -> Option<&'a str> {
    let mut fallback = None;
    for name in member_names {
        if name == CONVENTIONAL_THEME_PATH {
            return Some(name);
        }
        if fallback.is_none() && name.to_lowercase().contains("theme") && name.ends_with(".xml") {
            fallback = Some(name);
        }
    }
    fallback
}


/// A zip-based document package opened for reading.
#[derive(Debug)]
pub struct ThemePackage {
    path: PathBuf,
    zip_archive: ZipArchive<File>,
}
impl ThemePackage {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound { path: path.to_owned() });
        }
        let file = File::open(path)
            .map_err(|io_error| Error::io(path, io_error))?;
        let zip_archive = ZipArchive::new(file)
            .map_err(|zip_error| Error::OpeningPackage { path: path.to_owned(), zip_error })?;
        Ok(Self {
            path: path.to_owned(),
            zip_archive,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names of all members, in archive listing order.
    pub fn member_names(&mut self) -> Result<Vec<String>, Error> {
        let mut names = Vec::with_capacity(self.zip_archive.len());
        for i in 0..self.zip_archive.len() {
            let member = self.zip_archive.by_index_raw(i)
                .map_err(|zip_error| Error::ReadingFileWithinPackage { member: format!("#{}", i), zip_error })?;
            names.push(member.name().to_owned());
        }
        Ok(names)
    }

    pub fn find_theme_member(&mut self) -> Result<Option<String>, Error> {
        let names = self.member_names()?;
        let found = locate_theme_member(names.iter().map(|n| n.as_str()))
            .map(|n| n.to_owned());
        debug!("theme member of {}: {:?}", self.path.display(), found);
        Ok(found)
    }

    pub fn read_member(&mut self, member: &str) -> Result<Vec<u8>, Error> {
        let mut zip_file = self.zip_archive.by_name(member)
            .map_err(|zip_error| Error::ReadingFileWithinPackage { member: member.to_owned(), zip_error })?;
        let mut data = Vec::new();
        zip_file.read_to_end(&mut data)
            .map_err(|io_error| Error::ReadingBytesWithinPackage { member: member.to_owned(), io_error })?;
        Ok(data)
    }

    /// Locates, reads and parses the theme part.
    pub fn extract_theme(&mut self, hex_policy: HexPolicy) -> Result<ExtractedTheme, Error> {
        let member = self.find_theme_member()?
            .ok_or_else(|| Error::ThemeNotFound { path: self.path.clone() })?;
        let raw_xml = self.read_member(&member)?;
        ExtractedTheme::parse(&member, raw_xml, hex_policy)
    }
}


/// Extracts every member of the package into the directory.
pub(crate) fn unpack_into(package_path: &Path, directory: &Path) -> Result<(), Error> {
    let package = ThemePackage::open(package_path)?;
    let mut zip_archive = package.zip_archive;
    zip_archive.extract(directory)
        .map_err(|zip_error| Error::ExtractingPackage { path: package_path.to_owned(), zip_error })
}

/// Zips up every file below the directory, named by its path relative to the directory.
///
/// The content types part goes first, all other parts follow sorted by path.
pub(crate) fn pack_directory(directory: &Path, output_path: &Path) -> Result<(), Error> {
    let mut parts: Vec<(String, PathBuf)> = Vec::new();
    for entry_res in WalkDir::new(directory).sort_by_file_name() {
        let entry = entry_res
            .map_err(|walk_error| Error::io(directory, io::Error::from(walk_error)))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry.path().strip_prefix(directory)
            .map_err(|_| Error::io(entry.path(), io::Error::new(io::ErrorKind::Other, "path outside of package directory")))?;
        let name = relative.components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<String>>()
            .join("/");
        parts.push((name, entry.path().to_owned()));
    }
    parts.sort_by(|(a, _), (b, _)|
        (a != CONTENT_TYPES_PATH).cmp(&(b != CONTENT_TYPES_PATH))
            .then_with(|| a.cmp(b))
    );

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated);
    write_atomically(output_path, |file| {
        let mut zip_writer = ZipWriter::new(file);
        for (name, source_path) in &parts {
            zip_writer.start_file(name.as_str(), options)
                .map_err(|zip_error| Error::WritingPackage { path: output_path.to_owned(), zip_error })?;
            let mut source = File::open(source_path)
                .map_err(|io_error| Error::io(source_path, io_error))?;
            io::copy(&mut source, &mut zip_writer)
                .map_err(|io_error| Error::io(output_path, io_error))?;
        }
        zip_writer.finish()
            .map_err(|zip_error| Error::WritingPackage { path: output_path.to_owned(), zip_error })?;
        Ok(())
    })?;
    debug!("packed {} parts into {}", parts.len(), output_path.display());
    Ok(())
}

/// Writes a file by filling a temporary file in the same directory and renaming it over the destination.
///
/// If writing fails, the destination is left as it was.
pub(crate) fn write_atomically<F>(destination: &Path, write: F) -> Result<(), Error>
    where F: FnOnce(&mut File) -> Result<(), Error>
{
    let parent = match destination.parent() {
        Some(p) if p.as_os_str().len() > 0 => p,
        _ => Path::new("."),
    };
    let mut temp_file = NamedTempFile::new_in(parent)
        .map_err(|io_error| Error::io(parent, io_error))?;
    write(temp_file.as_file_mut())?;
    temp_file.as_file().sync_all()
        .map_err(|io_error| Error::io(temp_file.path(), io_error))?;
    temp_file.persist(destination)
        .map_err(|persist_error| Error::io(destination, persist_error.error))?;
    Ok(())
}
