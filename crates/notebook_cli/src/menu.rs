//! Menu actions and their text triggers.

pub const MENU_PROMPT: &str = "The system supports the following functions:
1. Add a note (input 'add');
2. Get the notes of a topic (input 'get');
3. Delete the first note with a name under a topic (input 'delete');
4. Delete all the notes of a topic (input 'delete all');
5. Add search links for a term (input 'wiki');
6. List topics (input 'topics');
7. Exit (input 'exit').
Input your need here: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Add,
    Get,
    Delete,
    DeleteAll,
    Wiki,
    Topics,
    Exit,
}

/// Maps one input line to an action; surrounding whitespace and case are ignored.
pub fn parse_action(input: &str) -> Option<MenuAction> {
    let normalized = input.split_whitespace().collect::<Vec<_>>().join(" ");
    match normalized.to_ascii_lowercase().as_str() {
        "add" | "1" => Some(MenuAction::Add),
        "get" | "2" => Some(MenuAction::Get),
        "delete" | "3" => Some(MenuAction::Delete),
        "delete all" | "4" => Some(MenuAction::DeleteAll),
        "wiki" | "5" => Some(MenuAction::Wiki),
        "topics" | "6" => Some(MenuAction::Topics),
        "exit" | "quit" | "7" => Some(MenuAction::Exit),
        _ => None,
    }
}
