use clap::{App, Arg, ArgMatches};
use std::str::FromStr;

static VERSION: &str = "0.1.0";
static AUTHOR: &str = "apmaros";
static DESCRIPTION: &str = "Upload photo albums to cloud storage";
const UPLOAD: &str = "upload";
pub(crate) const FOLDER: &str = "folder";
const FOLDER_SHORT: &str = "f";
pub(crate) const ALBUM: &str = "album";
const ALBUM_SHORT: &str = "a";
pub(crate) const LABELS: &str = "labels";
const LABELS_SHORT: &str = "l";

pub(crate) fn build_cli<'a>() -> ArgMatches<'a> {
    App::new("albumsync")
        .version(VERSION)
        .author(AUTHOR)
        .about(DESCRIPTION)
        .subcommand(
            App::new(UPLOAD)
                .help("Creates an album and uploads a folder of images into it")
                .arg(
                    Arg::with_name(FOLDER)
                        .short(FOLDER_SHORT)
                        .long(FOLDER)
                        .takes_value(true)
                        .help("Folder containing images to be uploaded")
                        .required(true),
                )
                .arg(
                    Arg::with_name(ALBUM)
                        .short(ALBUM_SHORT)
                        .long(ALBUM)
                        .takes_value(true)
                        .help("Name of the album to create for the images")
                        .required(true),
                )
                .arg(
                    Arg::with_name(LABELS)
                        .short(LABELS_SHORT)
                        .long(LABELS)
                        .takes_value(false)
                        .help("Runs image analysis and stores the detected labels"),
                ),
        )
        .get_matches()
}

pub(crate) enum CliCommand {
    Upload,
}

impl FromStr for CliCommand {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            UPLOAD => Ok(Self::Upload),
            other => Err(other.to_owned()),
        }
    }
}

impl CliCommand {
    pub(crate) fn to_str(&self) -> &str {
        match self {
            CliCommand::Upload => UPLOAD,
        }
    }
}

pub(crate) struct UploadCmd {
    pub(crate) folder_name: String,
    pub(crate) album_name: String,
    pub(crate) with_labels: bool,
}

impl UploadCmd {
    pub(crate) fn build(matches: &ArgMatches) -> Self {
        // safe to unwrap, these args are required
        let folder_name = matches.value_of(FOLDER).unwrap().to_owned();
        let album_name = matches.value_of(ALBUM).unwrap().to_owned();
        let with_labels = matches.is_present(LABELS);

        UploadCmd { folder_name, album_name, with_labels }
    }
}
