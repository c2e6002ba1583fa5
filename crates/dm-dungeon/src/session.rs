//! Interactive editing session.
//!
//! `Session` owns the document, the path it is saved to, and the RNG used
//! for table rolls. Each line of input is one command, executed to
//! completion before the next. [`Session::execute`] wraps every command in a
//! snapshot: a failed command leaves the document as it was, and a command
//! that panics gets the pre-command state written to disk before the panic
//! continues.

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand::rngs::StdRng;

use dm_tables::{DiceSpec, RangeTable, RenderOptions, RoomId, Span, TableId};

use crate::config::SessionConfig;
use crate::direction::Direction;
use crate::document::Document;
use crate::error::{DungeonError, DungeonResult};

/// Name of the room a new dungeon starts in.
pub const ENTRANCE: &str = "Entrance";

const HELP: &str = "\
Rooms:
  l, look                     describe where you are
  <dir>                       walk (n ne e se s sw w nw up down)
  d<dir> <name>               dig a new room that way
  create <name>               create an unconnected room
  move <room>                 jump to a room
  rooms                       list rooms
  connect <a> <b> <dir>       add a one-way exit
  disconnect <a> <b>          remove exits from a to b
  free [room]                 remove all exits of a room
  delete [room]               delete a room
  note, a <text>              add a note here
  notes, r [room]             read notes
  dnote [index]               delete a note here
  describe, sd <text>         set this room's description
  desc, d                     show this room's description
Tables:
  tables                      list tables (* = linked here)
  table new <NdS> <name>      create a table
  table show <id> [p] [f]     print a table (p: odds, f: free slots)
  table set <id> <a-b> <text> map a range to text
  table next <id> <text>      fill the first free slot
  table unset <id> <a-b>      remove the entry keyed exactly a-b
  table roll <id>             roll a table
  table describe <id> <text>  set a table's description
  table rename <id> <name>    rename a table
  table delete <id>           delete a table
  table link <id> [room]      roll this table in a room
  table unlink <id> [room]    stop rolling it there
  roll                        roll every table linked here
Other:
  save, help, quit";

/// An interactive editing session over one document.
pub struct Session {
    doc: Document,
    path: Option<PathBuf>,
    config: SessionConfig,
    rng: StdRng,
}

impl Session {
    /// Start a session on an in-memory document.
    pub fn new(mut doc: Document, config: SessionConfig) -> Self {
        doc.dungeon.ensure_current(ENTRANCE);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            doc,
            path: None,
            config,
            rng,
        }
    }

    /// Start a session on the document at `path`, creating it if missing.
    pub fn open(path: impl Into<PathBuf>, config: SessionConfig) -> DungeonResult<Self> {
        let path = path.into();
        let doc = Document::load(&path)?;
        let mut session = Self::new(doc, config);
        session.path = Some(path);
        Ok(session)
    }

    /// The document being edited.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// The session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Where the document is saved, if anywhere.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write the document to its path. Does nothing without a path.
    pub fn save(&self) -> DungeonResult<()> {
        match &self.path {
            Some(path) => self.doc.save(path),
            None => Ok(()),
        }
    }

    /// Run one line of input under the snapshot policy.
    pub fn execute(&mut self, input: &str) -> DungeonResult<String> {
        self.guarded(|session| session.process(input))
    }

    /// Run an edit under the snapshot policy.
    ///
    /// On error the document is restored to its state before the edit. If
    /// the edit panics, that earlier state is saved to the document path and
    /// the panic resumes. Successful edits that changed the document are
    /// saved when autosave is on; if that save fails the edit is rolled back
    /// too, so memory never holds changes the file lacks.
    pub fn guarded<F>(&mut self, edit: F) -> DungeonResult<String>
    where
        F: FnOnce(&mut Self) -> DungeonResult<String>,
    {
        let snapshot = self.doc.clone();
        match panic::catch_unwind(AssertUnwindSafe(|| edit(self))) {
            Ok(Ok(output)) => {
                let saved = if self.config.autosave && self.doc != snapshot {
                    self.save()
                } else {
                    Ok(())
                };
                if let Err(e) = saved {
                    tracing::warn!(error = %e, "autosave failed, edit rolled back");
                    self.doc = snapshot;
                    return Err(e);
                }
                Ok(output)
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "command failed, state restored");
                self.doc = snapshot;
                Err(e)
            }
            Err(payload) => {
                self.rescue(&snapshot);
                panic::resume_unwind(payload)
            }
        }
    }

    fn rescue(&self, snapshot: &Document) {
        let Some(path) = &self.path else {
            tracing::error!("command panicked and there is no path to save to");
            return;
        };
        match snapshot.save(path) {
            Ok(()) => tracing::error!(
                path = %path.display(),
                "command panicked, saved the state from before it"
            ),
            Err(e) => tracing::error!(error = %e, "command panicked and rescue save failed"),
        }
    }

    /// Parse and run one line of input. Prefer [`Session::execute`], which
    /// adds the snapshot policy.
    pub fn process(&mut self, input: &str) -> DungeonResult<String> {
        let (cmd, rest) = next_word(input);
        if cmd.is_empty() {
            return Ok(String::new());
        }
        let cmd = cmd.to_lowercase();
        tracing::debug!(command = %cmd, "processing");

        if let Ok(dir) = cmd.parse::<Direction>() {
            return self.do_follow(dir);
        }
        if let Some(dir) = cmd.strip_prefix('d').and_then(|d| d.parse::<Direction>().ok()) {
            return self.do_dig(dir, rest);
        }

        match cmd.as_str() {
            "look" | "l" => self.doc.dungeon.look(),
            "create" => self.do_create(rest),
            "move" => self.do_move(rest),
            "rooms" => self.do_rooms(),
            "connect" => self.do_connect(rest),
            "disconnect" => self.do_disconnect(rest),
            "free" => self.do_free(rest),
            "delete" => self.do_delete(rest),
            "note" | "a" => self.do_note(rest),
            "notes" | "r" => self.do_notes(rest),
            "dnote" => self.do_delete_note(rest),
            "describe" | "sd" => self.do_describe(rest),
            "desc" | "d" => self.do_show_description(),
            "tables" => self.do_tables(),
            "table" => self.do_table(rest),
            "roll" => self.do_roll_room(),
            "save" => self.do_save(),
            "help" => Ok(HELP.to_string()),
            "quit" | "q" => Ok("Goodbye!".to_string()),
            _ => Err(DungeonError::UnknownCommand(cmd)),
        }
    }

    // -----------------------------------------------------------------------
    // Rooms
    // -----------------------------------------------------------------------

    fn here(&self) -> DungeonResult<RoomId> {
        self.doc.dungeon.current_id()
    }

    fn room_or_here(&self, arg: &str) -> DungeonResult<RoomId> {
        if arg.is_empty() {
            self.here()
        } else {
            parse_room(arg)
        }
    }

    fn do_follow(&mut self, dir: Direction) -> DungeonResult<String> {
        self.doc.dungeon.follow(dir)?;
        self.doc.dungeon.look()
    }

    fn do_dig(&mut self, dir: Direction, name: &str) -> DungeonResult<String> {
        if name.is_empty() {
            return Err(DungeonError::Usage(format!("d{dir} <name>")));
        }
        self.doc.dungeon.dig(dir, name)?;
        self.doc.dungeon.look()
    }

    fn do_create(&mut self, name: &str) -> DungeonResult<String> {
        if name.is_empty() {
            return Err(DungeonError::Usage("create <name>".to_string()));
        }
        let id = self.doc.dungeon.create(name)?;
        Ok(format!("Created room {id}: {name}"))
    }

    fn do_move(&mut self, rest: &str) -> DungeonResult<String> {
        let (arg, _) = next_word(rest);
        if arg.is_empty() {
            return Err(DungeonError::Usage("move <room>".to_string()));
        }
        self.doc.dungeon.move_to(parse_room(arg)?)?;
        self.doc.dungeon.look()
    }

    fn do_rooms(&self) -> DungeonResult<String> {
        let here = self.here().ok();
        let lines: Vec<String> = self
            .doc
            .dungeon
            .rooms()
            .map(|room| {
                let mark = if Some(room.id) == here { " *" } else { "" };
                format!("{}: {}{mark}", room.id, room.name)
            })
            .collect();
        Ok(lines.join("\n"))
    }

    fn do_connect(&mut self, rest: &str) -> DungeonResult<String> {
        let args: Vec<&str> = rest.split_whitespace().collect();
        let [from, to, dir] = args.as_slice() else {
            return Err(DungeonError::Usage("connect <a> <b> <dir>".to_string()));
        };
        let (from, to, dir) = (parse_room(from)?, parse_room(to)?, dir.parse::<Direction>()?);
        self.doc.dungeon.connect(from, to, dir)?;
        Ok(format!("Connected {from} to {to} going {dir}"))
    }

    fn do_disconnect(&mut self, rest: &str) -> DungeonResult<String> {
        let args: Vec<&str> = rest.split_whitespace().collect();
        let [from, to] = args.as_slice() else {
            return Err(DungeonError::Usage("disconnect <a> <b>".to_string()));
        };
        let (from, to) = (parse_room(from)?, parse_room(to)?);
        self.doc.dungeon.disconnect(from, to)?;
        Ok(format!("Disconnected {from} from {to}"))
    }

    fn do_free(&mut self, rest: &str) -> DungeonResult<String> {
        let room = self.room_or_here(next_word(rest).0)?;
        self.doc.dungeon.free(room)?;
        Ok(format!("Removed all exits of room {room}"))
    }

    fn do_delete(&mut self, rest: &str) -> DungeonResult<String> {
        let room = self.room_or_here(next_word(rest).0)?;
        self.doc.delete_room(room)?;
        Ok(format!("Deleted room {room}\n{}", self.doc.dungeon.look()?))
    }

    fn do_note(&mut self, text: &str) -> DungeonResult<String> {
        if text.is_empty() {
            return Err(DungeonError::Usage("note <text>".to_string()));
        }
        let here = self.here()?;
        self.doc.dungeon.add_note(here, text)?;
        Ok("Noted.".to_string())
    }

    fn do_notes(&self, rest: &str) -> DungeonResult<String> {
        let room = self.room_or_here(next_word(rest).0)?;
        let notes = self.doc.dungeon.notes(room)?;
        if notes.is_empty() {
            return Ok("No notes.".to_string());
        }
        Ok(notes
            .iter()
            .enumerate()
            .map(|(i, note)| format!("{i} : {note}"))
            .collect::<Vec<_>>()
            .join("\n"))
    }

    fn do_delete_note(&mut self, rest: &str) -> DungeonResult<String> {
        let here = self.here()?;
        let (arg, _) = next_word(rest);
        let index = if arg.is_empty() {
            match self.doc.dungeon.notes(here)?.len() {
                0 => return Err(DungeonError::NoNotes(here)),
                1 => 0,
                _ => return Err(DungeonError::Usage("dnote <index>".to_string())),
            }
        } else {
            parse_number(arg)? as usize
        };
        let note = self.doc.dungeon.delete_note(here, index)?;
        Ok(format!("Deleted note: {note}"))
    }

    fn do_describe(&mut self, text: &str) -> DungeonResult<String> {
        if text.is_empty() {
            return Err(DungeonError::Usage("describe <text>".to_string()));
        }
        let here = self.here()?;
        self.doc.dungeon.set_description(here, text)?;
        Ok("Description set.".to_string())
    }

    fn do_show_description(&self) -> DungeonResult<String> {
        let room = self.doc.dungeon.current()?;
        Ok(room
            .description
            .clone()
            .unwrap_or_else(|| "No description.".to_string()))
    }

    fn do_save(&self) -> DungeonResult<String> {
        match &self.path {
            Some(path) => {
                self.doc.save(path)?;
                Ok(format!("Saved to {}", path.display()))
            }
            None => Err(DungeonError::Usage(
                "save needs a session opened from a file".to_string(),
            )),
        }
    }

    // -----------------------------------------------------------------------
    // Tables
    // -----------------------------------------------------------------------

    fn do_tables(&self) -> DungeonResult<String> {
        let catalog = &self.doc.catalog;
        if catalog.is_empty() {
            return Ok("No tables.".to_string());
        }
        let linked = self
            .here()
            .map(|room| catalog.tables_for_room(room))
            .unwrap_or(&[]);
        Ok(catalog
            .iter()
            .map(|(id, table)| {
                let mark = if linked.contains(&id) { " *" } else { "" };
                format!(
                    "{id}: {} ({}, {} entries){mark}",
                    table.name(),
                    table.dice(),
                    table.len()
                )
            })
            .collect::<Vec<_>>()
            .join("\n"))
    }

    fn do_table(&mut self, rest: &str) -> DungeonResult<String> {
        let (sub, args) = next_word(rest);
        match sub.to_lowercase().as_str() {
            "new" => self.do_table_new(args),
            "show" => self.do_table_show(args),
            "set" => self.do_table_set(args),
            "next" => self.do_table_next(args),
            "unset" => self.do_table_unset(args),
            "roll" => self.do_table_roll(args),
            "describe" => self.do_table_describe(args),
            "rename" => self.do_table_rename(args),
            "delete" => self.do_table_delete(args),
            "link" => self.do_table_link(args),
            "unlink" => self.do_table_unlink(args),
            _ => Err(DungeonError::Usage(
                "table new|show|set|next|unset|roll|describe|rename|delete|link|unlink"
                    .to_string(),
            )),
        }
    }

    fn do_table_new(&mut self, args: &str) -> DungeonResult<String> {
        let (dice, name) = next_word(args);
        if dice.is_empty() || name.is_empty() {
            return Err(DungeonError::Usage("table new <NdS> <name>".to_string()));
        }
        let dice: DiceSpec = dice.parse()?;
        let id = self.doc.catalog.add(RangeTable::new(dice, name))?;
        Ok(format!("Created table {id}: {name} ({dice})"))
    }

    fn do_table_show(&self, args: &str) -> DungeonResult<String> {
        let (id, flags) = next_word(args);
        let table = self.doc.catalog.require(parse_table(id)?)?;
        let mut options = RenderOptions {
            show_probabilities: self.config.show_probabilities,
            show_free: self.config.show_free,
        };
        for flag in flags.split_whitespace() {
            match flag {
                "p" => options.show_probabilities = true,
                "f" => options.show_free = true,
                other => {
                    return Err(DungeonError::Usage(format!(
                        "table show <id> [p] [f], not {other:?}"
                    )));
                }
            }
        }
        Ok(table.render(options).trim_end().to_string())
    }

    fn do_table_set(&mut self, args: &str) -> DungeonResult<String> {
        let (id, rest) = next_word(args);
        let (span, text) = next_word(rest);
        if span.is_empty() {
            return Err(DungeonError::Usage("table set <id> <a-b> <text>".to_string()));
        }
        let id = parse_table(id)?;
        let span: Span = span.parse()?;
        let table = self.doc.catalog.require_mut(id)?;
        table.assign(span.start(), span.end(), text)?;
        let chance = table.probability(span.start(), span.end());
        Ok(format!("Set {span} (probability {chance}): {text}"))
    }

    fn do_table_next(&mut self, args: &str) -> DungeonResult<String> {
        let (id, text) = next_word(args);
        let table = self.doc.catalog.require_mut(parse_table(id)?)?;
        let Some(slot) = table.first_free() else {
            return Err(DungeonError::Usage(
                "table is full; set an entry to something else or unset one to make space"
                    .to_string(),
            ));
        };
        table.assign_one(slot, text)?;
        let chance = table.entry_probability(slot);
        Ok(format!("Set {slot} (probability {chance}): {text}"))
    }

    fn do_table_unset(&mut self, args: &str) -> DungeonResult<String> {
        let (id, span) = next_word(args);
        if span.is_empty() {
            return Err(DungeonError::Usage("table unset <id> <a-b>".to_string()));
        }
        let id = parse_table(id)?;
        let span: Span = span.parse()?;
        let table = self.doc.catalog.require_mut(id)?;
        Ok(match table.remove(span.start(), span.end()) {
            Some(text) => format!("Removed {span}: {text}"),
            None => format!("No entry at exactly {span}."),
        })
    }

    fn do_table_roll(&mut self, args: &str) -> DungeonResult<String> {
        let id = parse_table(next_word(args).0)?;
        let table = self.doc.catalog.require(id)?;
        Ok(describe_roll(table, &mut self.rng))
    }

    fn do_table_describe(&mut self, args: &str) -> DungeonResult<String> {
        let (id, text) = next_word(args);
        let table = self.doc.catalog.require_mut(parse_table(id)?)?;
        table.set_description(text);
        Ok("Description set.".to_string())
    }

    fn do_table_rename(&mut self, args: &str) -> DungeonResult<String> {
        let (id, name) = next_word(args);
        if name.is_empty() {
            return Err(DungeonError::Usage("table rename <id> <name>".to_string()));
        }
        let table = self.doc.catalog.require_mut(parse_table(id)?)?;
        table.rename(name);
        Ok(format!("Renamed to {name}"))
    }

    fn do_table_delete(&mut self, args: &str) -> DungeonResult<String> {
        let id = parse_table(next_word(args).0)?;
        let table = self.doc.catalog.delete(id)?;
        Ok(format!("Deleted table {id}: {}", table.name()))
    }

    fn do_table_link(&mut self, args: &str) -> DungeonResult<String> {
        let (id, room) = next_word(args);
        let id = parse_table(id)?;
        let room = self.room_or_here(next_word(room).0)?;
        self.doc.catalog.associate(id, room, &self.doc.dungeon)?;
        Ok(format!("Table {id} linked to room {room}"))
    }

    fn do_table_unlink(&mut self, args: &str) -> DungeonResult<String> {
        let (id, room) = next_word(args);
        let id = parse_table(id)?;
        let room = self.room_or_here(next_word(room).0)?;
        self.doc.catalog.dissociate(id, room, &self.doc.dungeon)?;
        Ok(format!("Table {id} unlinked from room {room}"))
    }

    fn do_roll_room(&mut self) -> DungeonResult<String> {
        let here = self.here()?;
        let ids = self.doc.catalog.tables_for_room(here);
        if ids.is_empty() {
            return Ok("No tables in this room.".to_string());
        }
        let mut lines = Vec::with_capacity(ids.len());
        for id in ids {
            let table = self.doc.catalog.require(*id)?;
            lines.push(describe_roll(table, &mut self.rng));
        }
        Ok(lines.join("\n"))
    }
}

/// Split off the first whitespace-separated word; the remainder is trimmed.
fn next_word(input: &str) -> (&str, &str) {
    let input = input.trim();
    match input.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (input, ""),
    }
}

fn parse_number(s: &str) -> DungeonResult<u32> {
    s.parse::<u32>()
        .map_err(|_| DungeonError::InvalidNumber(s.to_string()))
}

fn parse_room(s: &str) -> DungeonResult<RoomId> {
    parse_number(s).map(RoomId)
}

fn parse_table(s: &str) -> DungeonResult<TableId> {
    if s.is_empty() {
        return Err(DungeonError::Usage("missing table id".to_string()));
    }
    parse_number(s).map(TableId)
}

fn describe_roll(table: &RangeTable, rng: &mut StdRng) -> String {
    let roll = table.roll(rng);
    let text = match roll.text {
        Some("") => "(blank)",
        Some(text) => text,
        None => "nothing",
    };
    format!("{} ({}) rolled {}: {text}", table.name(), table.dice(), roll.value)
}
