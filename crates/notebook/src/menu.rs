use std::io::{self, BufRead, Write};

use notebook_output::{format_created, format_deleted, format_updated, format_user, format_users};
use notebook_store::{LenientRepository, Repository};
use notebook_types::User;

const MENU: &str = "\
1) create   2) read   3) list   4) update   5) delete   0) exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuCommand {
    Create,
    Read,
    List,
    Update,
    Delete,
    Exit,
}

impl MenuCommand {
    fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "1" | "create" | "c" => Some(Self::Create),
            "2" | "read" | "show" | "r" => Some(Self::Read),
            "3" | "list" | "ls" | "l" => Some(Self::List),
            "4" | "update" | "u" => Some(Self::Update),
            "5" | "delete" | "rm" | "d" => Some(Self::Delete),
            "0" | "exit" | "quit" | "q" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Interactive prompt loop over a store.
///
/// Store failures are logged and the loop keeps going.
pub struct Menu<R, I, O> {
    repo: LenientRepository<R>,
    input: I,
    output: O,
}

impl<R: Repository, I: BufRead, O: Write> Menu<R, I, O> {
    pub fn new(repo: R, input: I, output: O) -> Self {
        Self {
            repo: LenientRepository::new(repo),
            input,
            output,
        }
    }

    /// Runs until `exit` or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        loop {
            writeln!(self.output, "{}", MENU)?;
            let Some(choice) = self.prompt("> ")? else {
                return Ok(());
            };
            if choice.trim().is_empty() {
                continue;
            }

            match MenuCommand::parse(&choice) {
                Some(MenuCommand::Exit) => return Ok(()),
                Some(command) => {
                    if !self.dispatch(command)? {
                        return Ok(());
                    }
                }
                None => writeln!(self.output, "Unknown command: {}", choice.trim())?,
            }
        }
    }

    /// Returns `false` when input ran out mid-command.
    fn dispatch(&mut self, command: MenuCommand) -> io::Result<bool> {
        match command {
            MenuCommand::Create => {
                let Some(user) = self.prompt_user()? else {
                    return Ok(false);
                };
                let missing = user.missing_fields();
                if !missing.is_empty() {
                    writeln!(self.output, "Required: {}", missing.join(", "))?;
                    return Ok(true);
                }
                let created = self.repo.create(user);
                if created.is_stored() {
                    writeln!(self.output, "{}", format_created(&created))?;
                } else {
                    writeln!(self.output, "Could not save user")?;
                }
            }
            MenuCommand::Read => {
                let Some(id) = self.prompt_id()? else {
                    return Ok(false);
                };
                if let Some(id) = id {
                    match self.repo.find_by_id(id) {
                        Some(user) => writeln!(self.output, "{}", format_user(&user))?,
                        None => writeln!(self.output, "No user with id {}", id)?,
                    }
                }
            }
            MenuCommand::List => {
                writeln!(self.output, "{}", format_users(&self.repo.find_all()))?;
            }
            MenuCommand::Update => {
                let Some(id) = self.prompt_id()? else {
                    return Ok(false);
                };
                if let Some(id) = id {
                    writeln!(self.output, "Leave a field empty to keep it.")?;
                    let Some(patch) = self.prompt_user()? else {
                        return Ok(false);
                    };
                    let updated = self.repo.update(id, patch);
                    writeln!(self.output, "{}", format_updated(id, updated.as_ref()))?;
                }
            }
            MenuCommand::Delete => {
                let Some(id) = self.prompt_id()? else {
                    return Ok(false);
                };
                if let Some(id) = id {
                    let deleted = self.repo.delete(id);
                    writeln!(self.output, "{}", format_deleted(id, deleted))?;
                }
            }
            MenuCommand::Exit => return Ok(false),
        }
        Ok(true)
    }

    fn prompt(&mut self, message: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", message)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\n', '\r']).to_string()))
    }

    /// `Ok(Some(None))` means the entry was not a valid id.
    fn prompt_id(&mut self) -> io::Result<Option<Option<u64>>> {
        let Some(raw) = self.prompt("id: ")? else {
            return Ok(None);
        };
        match raw.trim().parse::<u64>() {
            Ok(id) => Ok(Some(Some(id))),
            Err(_) => {
                writeln!(self.output, "Invalid id: {}", raw.trim())?;
                Ok(Some(None))
            }
        }
    }

    fn prompt_user(&mut self) -> io::Result<Option<User>> {
        let Some(first_name) = self.prompt("first name: ")? else {
            return Ok(None);
        };
        let Some(last_name) = self.prompt("last name: ")? else {
            return Ok(None);
        };
        let Some(phone) = self.prompt("phone: ")? else {
            return Ok(None);
        };
        Ok(Some(User::new(first_name, last_name, phone)))
    }
}
