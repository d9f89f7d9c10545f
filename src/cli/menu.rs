//! Interactive genealogy menu
//!
//! Reads raw lines, re-prompts until each value is valid and only then calls
//! the service. Rule violations reported by the service are printed and the
//! menu goes on; only I/O failures end the session early.

use std::io::{BufRead, Write};

use tracing::{debug, instrument};

use crate::application::services::GenealogyService;
use crate::application::ApplicationError;
use crate::cli::error::{CliError, CliResult};
use crate::cli::output::{write_error, write_header, write_info, write_prompt, write_success};
use crate::config::Settings;
use crate::domain::{
    parse_age, parse_id, parse_name, DomainError, MemberId, NewMember, TraversalOrder,
};

const EMPTY_TREE: &str = "El árbol está vacío.";

/// Menu entries, numbered as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    CreateRoot,
    AddMember,
    Traverse(TraversalOrder),
    Ancestry,
    ShowTree,
    Exit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(Self::CreateRoot),
            "2" => Some(Self::AddMember),
            "3" => Some(Self::Traverse(TraversalOrder::InOrder)),
            "4" => Some(Self::Traverse(TraversalOrder::PreOrder)),
            "5" => Some(Self::Traverse(TraversalOrder::PostOrder)),
            "6" => Some(Self::Ancestry),
            "7" => Some(Self::ShowTree),
            "8" => Some(Self::Exit),
            _ => None,
        }
    }
}

/// Whether the session continues after an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Console collaborator driving one `GenealogyService`.
pub struct Menu<'a, R, W> {
    service: &'a GenealogyService,
    settings: &'a Settings,
    input: R,
    out: W,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(service: &'a GenealogyService, settings: &'a Settings, input: R, out: W) -> Self {
        Self {
            service,
            settings,
            input,
            out,
        }
    }

    /// Give back the output sink, e.g. to inspect what was written.
    pub fn into_output(self) -> W {
        self.out
    }

    /// Runs until "exit" or end of input, then tears the tree down.
    #[instrument(level = "debug", skip(self))]
    pub fn run(&mut self) -> CliResult<()> {
        loop {
            self.print_menu()?;
            let Some(line) = self.read_line()? else {
                debug!("input closed");
                break;
            };
            let flow = match MenuChoice::parse(&line) {
                Some(MenuChoice::Exit) => {
                    self.info("Saliendo del programa...")?;
                    Flow::Quit
                }
                Some(choice) => self.dispatch(choice)?,
                None => {
                    self.error("Opción inválida. Intente nuevamente.")?;
                    Flow::Continue
                }
            };
            if flow == Flow::Quit {
                break;
            }
        }
        self.service.teardown()?;
        Ok(())
    }

    fn dispatch(&mut self, choice: MenuChoice) -> CliResult<Flow> {
        debug!(?choice, "menu choice");
        match choice {
            MenuChoice::CreateRoot => self.create_root(),
            MenuChoice::AddMember => self.add_member(),
            MenuChoice::Traverse(order) => self.traverse(order),
            MenuChoice::Ancestry => self.ancestry(),
            MenuChoice::ShowTree => self.show_tree(),
            MenuChoice::Exit => Ok(Flow::Quit),
        }
    }

    fn print_menu(&mut self) -> CliResult<()> {
        write_header(&mut self.out, "--- ÁRBOL GENEALÓGICO ---").map_err(write_err)?;
        for line in [
            "1. Insertar miembro raíz",
            "2. Insertar nuevo miembro",
            "3. Mostrar recorrido Inorden",
            "4. Mostrar recorrido Preorden",
            "5. Mostrar recorrido Postorden",
            "6. Mostrar ascendencia de un miembro",
            "7. Mostrar árbol",
            "8. Salir",
        ] {
            self.info(line)?;
        }
        self.prompt("Seleccione una opción:")
    }

    fn create_root(&mut self) -> CliResult<Flow> {
        if !self.service.is_empty()? {
            self.error("Ya existe una raíz. Solo se permite una.")?;
            return Ok(Flow::Continue);
        }
        let Some(member) = self.prompt_member("Ingrese ID del ancestro más antiguo:", None)?
        else {
            return Ok(Flow::Quit);
        };
        let name = member.name().to_string();
        match self.service.create_root(member) {
            Ok(_) => self.success(&format!("Miembro raíz '{}' agregado con éxito.", name))?,
            Err(e) => self.report(e)?,
        }
        Ok(Flow::Continue)
    }

    fn add_member(&mut self) -> CliResult<Flow> {
        if self.service.is_empty()? {
            self.error("Primero debe crear el miembro raíz.")?;
            return Ok(Flow::Continue);
        }
        let Some(parent_id) = self.prompt_id("Ingrese ID del padre:", true, None)? else {
            return Ok(Flow::Quit);
        };
        let Some(member) =
            self.prompt_member("Ingrese ID del nuevo miembro:", Some(parent_id))?
        else {
            return Ok(Flow::Quit);
        };
        match self.service.add_child(parent_id, member) {
            Ok(placed) => self.success(&format!(
                "{} agregado como {} de {}",
                placed.child.name(),
                placed.slot,
                placed.parent.name()
            ))?,
            Err(e) => self.report(e)?,
        }
        Ok(Flow::Continue)
    }

    fn traverse(&mut self, order: TraversalOrder) -> CliResult<Flow> {
        let members = self.service.traverse(order)?;
        if members.is_empty() {
            self.info(EMPTY_TREE)?;
            return Ok(Flow::Continue);
        }
        write_header(
            &mut self.out,
            &format!("Recorrido {} del árbol genealógico:", order),
        )
        .map_err(write_err)?;
        for member in &members {
            self.info(member)?;
        }
        Ok(Flow::Continue)
    }

    fn ancestry(&mut self) -> CliResult<Flow> {
        if self.service.is_empty()? {
            self.info(EMPTY_TREE)?;
            return Ok(Flow::Continue);
        }
        let Some(id) =
            self.prompt_id("Ingrese ID del miembro para ver su ascendencia:", true, None)?
        else {
            return Ok(Flow::Quit);
        };
        match self.service.ancestry(id) {
            Ok(chain) => {
                if let Some(member) = chain.first() {
                    write_header(&mut self.out, &format!("Ascendencia de {}:", member.name()))
                        .map_err(write_err)?;
                }
                let names: Vec<&str> = chain.iter().map(|m| m.name()).collect();
                let line = names.join(self.settings.ancestry_separator.as_str());
                self.info(&line)?;
            }
            Err(e) => self.report(e)?,
        }
        Ok(Flow::Continue)
    }

    fn show_tree(&mut self) -> CliResult<Flow> {
        if self.service.is_empty()? {
            self.info(EMPTY_TREE)?;
            return Ok(Flow::Continue);
        }
        let rendered = self.service.render()?;
        write!(self.out, "{}", rendered).map_err(write_err)?;
        Ok(Flow::Continue)
    }

    /// Id (free, and not the parent's), name and age; None when input ends.
    fn prompt_member(
        &mut self,
        id_message: &str,
        parent: Option<MemberId>,
    ) -> CliResult<Option<NewMember>> {
        let Some(id) = self.prompt_free_id(id_message, parent)? else {
            return Ok(None);
        };
        let Some(name) = self.prompt_name()? else {
            return Ok(None);
        };
        let Some(age) = self.prompt_age()? else {
            return Ok(None);
        };
        Ok(Some(NewMember::new(id, name, age).map_err(ApplicationError::from)?))
    }

    /// Positive id for a new member. Reusing the parent's id is reported as
    /// self-parenting before the generic "already exists" check.
    fn prompt_free_id(
        &mut self,
        message: &str,
        parent: Option<MemberId>,
    ) -> CliResult<Option<MemberId>> {
        loop {
            let Some(id) = self.prompt_id(message, false, parent)? else {
                return Ok(None);
            };
            if Some(id) == parent {
                self.error(&DomainError::InvalidSelfParent(id))?;
                continue;
            }
            return Ok(Some(id));
        }
    }

    /// Positive id that must (or must not) already be in the tree.
    /// `passthrough` is handed back unchecked so the caller can judge it.
    fn prompt_id(
        &mut self,
        message: &str,
        must_exist: bool,
        passthrough: Option<MemberId>,
    ) -> CliResult<Option<MemberId>> {
        loop {
            self.prompt(message)?;
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            let id = match parse_id(&line) {
                Ok(id) => id,
                Err(e) => {
                    self.error(&e)?;
                    continue;
                }
            };
            if Some(id) == passthrough {
                return Ok(Some(id));
            }
            let exists = self.service.exists(id)?;
            if must_exist && !exists {
                self.error(&format!("El ID {} no existe", id))?;
            } else if !must_exist && exists {
                self.error(&format!("El ID {} ya existe", id))?;
            } else {
                return Ok(Some(id));
            }
        }
    }

    fn prompt_name(&mut self) -> CliResult<Option<String>> {
        loop {
            self.prompt("Ingrese nombre:")?;
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            match parse_name(&line) {
                Ok(name) => return Ok(Some(name)),
                Err(e) => self.error(&e)?,
            }
        }
    }

    fn prompt_age(&mut self) -> CliResult<Option<u8>> {
        loop {
            self.prompt("Ingrese edad en anos:")?;
            let Some(line) = self.read_line()? else {
                return Ok(None);
            };
            match parse_age(&line) {
                Ok(age) => return Ok(Some(age)),
                Err(e) => self.error(&e)?,
            }
        }
    }

    /// Domain rule violations are shown; anything else aborts the session.
    fn report(&mut self, err: ApplicationError) -> CliResult<()> {
        match err {
            ApplicationError::Domain(e) => self.error(&e),
            other => Err(other.into()),
        }
    }

    fn read_line(&mut self) -> CliResult<Option<String>> {
        let mut buf = String::new();
        let n = self
            .input
            .read_line(&mut buf)
            .map_err(|e| CliError::io("read menu input", e))?;
        if n == 0 {
            return Ok(None);
        }
        Ok(Some(buf.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn prompt(&mut self, msg: &str) -> CliResult<()> {
        write_prompt(&mut self.out, msg).map_err(write_err)
    }

    fn info(&mut self, msg: &(impl std::fmt::Display + ?Sized)) -> CliResult<()> {
        write_info(&mut self.out, msg).map_err(write_err)
    }

    fn success(&mut self, msg: &str) -> CliResult<()> {
        write_success(&mut self.out, msg).map_err(write_err)
    }

    fn error(&mut self, msg: &(impl std::fmt::Display + ?Sized)) -> CliResult<()> {
        write_error(&mut self.out, msg).map_err(write_err)
    }
}

fn write_err(e: std::io::Error) -> CliError {
    CliError::io("write menu output", e)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", Some(MenuChoice::CreateRoot))]
    #[case(" 4 ", Some(MenuChoice::Traverse(TraversalOrder::PreOrder)))]
    #[case("8", Some(MenuChoice::Exit))]
    #[case("9", None)]
    #[case("", None)]
    fn menu_choice_parse(#[case] input: &str, #[case] expected: Option<MenuChoice>) {
        assert_eq!(MenuChoice::parse(input), expected);
    }
}
