//! Loading frame sets, scripts and lexicons from XML definition files.
//!
//! ## Frame sets
//!
//! ```xml
//! <frames>
//!   <frame name="pet">
//!     species: noun.animal | animal
//!     name:    *           | *      | pos=NNP
//!   </frame>
//! </frames>
//! ```
//!
//! ## Scripts
//!
//! ```xml
//! <scenario name="intro">
//!   <dialogue>
//!     <line>Hello!</line>
//!     <line>
//!       What pet do you have?
//!       <response f="pet" action="continue"/>
//!       <response f="nothing" action="defer:farewell" transfer="true"/>
//!     </line>
//!     <line>Nice, $pet.name the $pet.species.</line>
//!   </dialogue>
//!   <frames>
//!     <frame name="nothing">word: * | * | pattern=none|nothing</frame>
//!   </frames>
//! </scenario>
//! ```
//!
//! A response transfers its knowledge when it carries a `transfer`
//! attribute, unless the attribute's value is `false`, `no` or `0`.
//!
//! ## Lexicons
//!
//! ```xml
//! <lexicon>
//!   <sense id="cat.n.01" lexname="noun.animal" lemmas="cat,kitty" hypernyms="feline.n.01"/>
//!   <tag word="rex" pos="NNP"/>
//! </lexicon>
//! ```
//!
//! Directory loaders keep going past broken files and collect the failures
//! in a [`LoadReport`].

mod document;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::LoadError;
use crate::frame::Frame;
use crate::ontology::{Lexicon, PosTag, Sense, SenseEntry, SenseId};
use crate::registry::FrameRegistry;
use crate::script::{Action, Line, Response, Script, ScriptLibrary};

use document::Element;

/// What a directory load produced.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Names of the frames or scripts that were registered.
    pub loaded: Vec<String>,
    /// Files or definitions that were skipped.
    pub errors: Vec<LoadError>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }

    fn skip(&mut self, error: LoadError) {
        warn!(%error, "skipping definition");
        self.errors.push(error);
    }
}

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn root(xml: &str, path: &Path, expected: &str) -> Result<Element, LoadError> {
    let root = document::parse(xml).map_err(|reason| LoadError::Xml {
        path: path.to_path_buf(),
        reason,
    })?;
    if root.name != expected {
        return Err(structure(
            path,
            format!("expected <{expected}> as the root element, found <{}>", root.name),
        ));
    }
    Ok(root)
}

fn structure(path: &Path, reason: impl Into<String>) -> LoadError {
    LoadError::Structure {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

fn required<'e>(element: &'e Element, key: &str, path: &Path) -> Result<&'e str, LoadError> {
    element
        .attribute(key)
        .ok_or_else(|| structure(path, format!("<{}> is missing the '{key}' attribute", element.name)))
}

fn comma_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Every `.xml` file directly inside `dir`, sorted by path.
fn xml_files(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let io = |source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    };
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(io)? {
        let path = entry.map_err(io)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("xml")) {
            files.push(path);
        } else {
            debug!(path = %path.display(), "ignoring non-definition file");
        }
    }
    files.sort();
    Ok(files)
}

// Frames

fn parse_frame(element: &Element, path: &Path) -> Result<Frame, LoadError> {
    if element.name != "frame" {
        return Err(structure(path, format!("unexpected <{}> among frames", element.name)));
    }
    let name = required(element, "name", path)?;
    Frame::from_definition(name, &element.text()).map_err(|source| LoadError::Frame {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse a `<frames>` document.
pub fn parse_frames(xml: &str, path: &Path) -> Result<Vec<Frame>, LoadError> {
    let root = root(xml, path, "frames")?;
    root.elements().map(|element| parse_frame(element, path)).collect()
}

pub fn load_frames_file(path: impl AsRef<Path>) -> Result<Vec<Frame>, LoadError> {
    let path = path.as_ref();
    parse_frames(&read(path)?, path)
}

/// Register the frames of every `.xml` file in `dir`.
///
/// A broken file is skipped as a whole; a frame whose name is already
/// registered is skipped on its own. Only an unreadable directory fails.
pub fn load_frames_dir(
    dir: impl AsRef<Path>,
    registry: &mut FrameRegistry,
) -> Result<LoadReport, LoadError> {
    let mut report = LoadReport::default();
    for path in xml_files(dir.as_ref())? {
        let frames = match load_frames_file(&path) {
            Ok(frames) => frames,
            Err(error) => {
                report.skip(error);
                continue;
            }
        };
        for frame in frames {
            let name = frame.name().to_string();
            match registry.register(frame) {
                Ok(()) => report.loaded.push(name),
                Err(source) => report.skip(LoadError::Frame {
                    path: path.clone(),
                    source,
                }),
            }
        }
    }
    debug!(loaded = report.loaded.len(), skipped = report.errors.len(), "loaded frames");
    Ok(report)
}

// Scripts

fn transfers(response: &Element) -> bool {
    match response.attribute("transfer") {
        None => false,
        Some(value) => !matches!(value.trim().to_lowercase().as_str(), "false" | "no" | "0"),
    }
}

fn parse_response(element: &Element, path: &Path) -> Result<Response, LoadError> {
    let frames = required(element, "f", path)?;
    let action = required(element, "action", path)?;
    let action = Action::parse(action, transfers(element)).map_err(|source| LoadError::Script {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Response::new(comma_list(frames), action))
}

fn parse_line(element: &Element, path: &Path) -> Result<Line, LoadError> {
    if element.name != "line" {
        return Err(structure(path, format!("unexpected <{}> in dialogue", element.name)));
    }
    let mut line = Line::new(element.text().trim());
    for child in element.elements() {
        if child.name == "response" {
            line = line.response(parse_response(child, path)?);
        } else {
            debug!(path = %path.display(), tag = %child.name, "ignoring element in line");
        }
    }
    Ok(line)
}

/// Parse a `<scenario>` document.
pub fn parse_script(xml: &str, path: &Path) -> Result<Script, LoadError> {
    let root = root(xml, path, "scenario")?;
    let name = required(&root, "name", path)?;
    let dialogue = root
        .child("dialogue")
        .ok_or_else(|| structure(path, "scenario has no <dialogue>"))?;

    let mut builder = Script::builder(name);
    for element in dialogue.elements() {
        builder = builder.line(parse_line(element, path)?);
    }
    if let Some(frames) = root.child("frames") {
        for element in frames.elements() {
            builder = builder.frame(parse_frame(element, path)?);
        }
    }
    Ok(builder.build())
}

pub fn load_script_file(path: impl AsRef<Path>) -> Result<Script, LoadError> {
    let path = path.as_ref();
    parse_script(&read(path)?, path)
}

/// Register the script of every `.xml` file in `dir`, skipping broken files
/// and duplicate names.
pub fn load_scripts_dir(
    dir: impl AsRef<Path>,
    library: &mut ScriptLibrary,
) -> Result<LoadReport, LoadError> {
    let mut report = LoadReport::default();
    for path in xml_files(dir.as_ref())? {
        let script = match load_script_file(&path) {
            Ok(script) => script,
            Err(error) => {
                report.skip(error);
                continue;
            }
        };
        let name = script.name().to_string();
        match library.register(script) {
            Ok(()) => report.loaded.push(name),
            Err(source) => report.skip(LoadError::Script { path, source }),
        }
    }
    debug!(loaded = report.loaded.len(), skipped = report.errors.len(), "loaded scripts");
    Ok(report)
}

// Lexicons

fn parse_sense(element: &Element, path: &Path) -> Result<SenseEntry, LoadError> {
    let id = required(element, "id", path)?;
    let category = required(element, "lexname", path)?;
    let lemmas = comma_list(required(element, "lemmas", path)?);
    let narrow = match element.attribute("category") {
        Some(narrow) => narrow.trim().to_string(),
        None => lemmas
            .first()
            .cloned()
            .ok_or_else(|| structure(path, format!("sense '{id}' has no lemmas")))?,
    };
    let hypernyms = element
        .attribute("hypernyms")
        .map(comma_list)
        .unwrap_or_default()
        .into_iter()
        .map(SenseId::new)
        .collect();
    Ok(SenseEntry {
        sense: Sense::new(id.trim(), category.trim(), narrow),
        lemmas,
        hypernyms,
    })
}

/// Parse a `<lexicon>` document.
pub fn parse_lexicon(xml: &str, path: &Path) -> Result<Lexicon, LoadError> {
    let root = root(xml, path, "lexicon")?;
    let mut lexicon = Lexicon::new();
    for element in root.elements() {
        match element.name.as_str() {
            "sense" => lexicon.insert(parse_sense(element, path)?),
            "tag" => {
                let word = required(element, "word", path)?;
                let pos = required(element, "pos", path)?;
                lexicon.set_tag(word.trim(), PosTag::new(pos));
            }
            other => {
                return Err(structure(path, format!("unexpected <{other}> in lexicon")));
            }
        }
    }
    debug!(path = %path.display(), senses = lexicon.len(), "loaded lexicon");
    Ok(lexicon)
}

pub fn load_lexicon(path: impl AsRef<Path>) -> Result<Lexicon, LoadError> {
    let path = path.as_ref();
    parse_lexicon(&read(path)?, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::{Ontology, Tagger};
    use pretty_assertions::assert_eq;

    fn here() -> &'static Path {
        Path::new("inline.xml")
    }

    #[test]
    fn frames_are_parsed_with_their_filters() {
        let frames = parse_frames(
            r#"<frames>
                 <frame name="Pet">
                   species: noun.animal | animal
                   name: * | * | pos=NNP
                 </frame>
                 <frame name="empty"></frame>
               </frames>"#,
            here(),
        )
        .unwrap();

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].name(), "pet");
        let fields: Vec<&str> = frames[0].fields().map(|(name, _)| name).collect();
        assert_eq!(fields, vec!["species", "name"]);
        assert_eq!(
            frames[0].field("species").unwrap().lexical_category(),
            Some("noun.animal")
        );
        assert_eq!(frames[1].field_count(), 0);
    }

    #[test]
    fn frame_without_name_is_a_structure_error() {
        let error = parse_frames("<frames><frame>a: *</frame></frames>", here()).unwrap_err();
        assert!(matches!(error, LoadError::Structure { .. }), "{error}");
    }

    #[test]
    fn wrong_root_is_rejected() {
        let error = parse_script("<frames/>", here()).unwrap_err();
        assert!(matches!(error, LoadError::Structure { .. }), "{error}");
    }

    #[test]
    fn scripts_are_parsed_with_lines_responses_and_local_frames() {
        let script = parse_script(
            r#"<scenario name="Intro">
                 <dialogue>
                   <line>Hello!</line>
                   <line>
                     What pet do you have?
                     <response f="pet, owner" action="continue"/>
                     <response f="nothing" action="defer:Farewell" transfer=""/>
                     <response f="nothing" action="defer:farewell" transfer="false"/>
                   </line>
                 </dialogue>
                 <frames>
                   <frame name="nothing">word: * | * | pattern=none|nothing</frame>
                 </frames>
               </scenario>"#,
            here(),
        )
        .unwrap();

        assert_eq!(script.name(), "intro");
        assert_eq!(script.lines().len(), 2);
        assert!(script.lines()[0].is_informational());

        let line = &script.lines()[1];
        assert_eq!(line.template.source(), "What pet do you have?");
        assert_eq!(
            line.responses,
            vec![
                Response::new(["pet", "owner"], Action::Continue),
                Response::new(["nothing"], Action::defer("farewell", true)),
                Response::new(["nothing"], Action::defer("farewell", false)),
            ]
        );
        assert!(script.local_frames().contains("nothing"));
    }

    #[test]
    fn bad_action_is_a_script_error() {
        let error = parse_script(
            r#"<scenario name="s"><dialogue>
                 <line>Hi<response f="pet" action="jump"/></line>
               </dialogue></scenario>"#,
            here(),
        )
        .unwrap_err();
        assert!(matches!(error, LoadError::Script { .. }), "{error}");
    }

    #[test]
    fn lexicon_senses_and_tags_are_loaded() {
        let lexicon = parse_lexicon(
            r#"<lexicon>
                 <sense id="cat.n.01" lexname="noun.animal" lemmas="cat, kitty" hypernyms="feline.n.01"/>
                 <sense id="feline.n.01" lexname="noun.animal" lemmas="feline" category="felid"/>
                 <tag word="Rex" pos="nnp"/>
               </lexicon>"#,
            here(),
        )
        .unwrap();

        assert_eq!(lexicon.len(), 2);
        let cat = lexicon.senses("kitty").remove(0);
        assert_eq!(cat.narrow_category(), "cat");
        let parents = lexicon.hypernyms(&cat);
        assert_eq!(parents[0].narrow_category(), "felid");
        assert_eq!(lexicon.tag("rex"), PosTag::new("NNP"));
    }
}
