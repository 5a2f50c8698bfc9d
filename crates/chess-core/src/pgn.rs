//! PGN reading and writing for move trees.
//!
//! Reading goes through a `pgn_reader::Visitor` that keeps a cursor into the
//! tree plus a stack of cursors for open variations. Writing renders the tree
//! back to movetext with move numbers, NAGs, comments and nested variations.

use pgn_reader::{Nag, RawComment, RawTag, Reader, SanPlus, Skip, Visitor};
use regex::Regex;
use shakmaty::{Color, Position};
use std::ops::ControlFlow;
use std::sync::LazyLock;
use tracing::debug;

use crate::error::TreeError;
use crate::tree::{GameTree, NodeId, NodeOrigin};

static COMMAND_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[%(\w+)\s+([^\]]*)\]").expect("valid command regex"));

static ORIGIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\[%origin\s+candidate\s*\]\s*").expect("valid origin regex"));

/// Comment command marking the first node of a branch that came from a
/// candidate answer. Descendants inherit the origin.
pub const CANDIDATE_MARKER: &str = "[%origin candidate]";

/// Cursor state while a game's movetext is being read.
struct TreeState {
    tree: GameTree,
    current: NodeId,
    open_variations: Vec<NodeId>,
}

/// Visitor that builds one `GameTree` per game.
struct TreeBuilder {
    origin: NodeOrigin,
}

impl Visitor for TreeBuilder {
    type Tags = Vec<(String, String)>;
    type Movetext = TreeState;
    type Output = Result<GameTree, TreeError>;

    fn begin_tags(&mut self) -> ControlFlow<Self::Output, Self::Tags> {
        ControlFlow::Continue(Vec::new())
    }

    fn tag(
        &mut self,
        tags: &mut Self::Tags,
        name: &[u8],
        value: RawTag<'_>,
    ) -> ControlFlow<Self::Output> {
        tags.push((
            String::from_utf8_lossy(name).into_owned(),
            value.decode_utf8_lossy().into_owned(),
        ));
        ControlFlow::Continue(())
    }

    fn begin_movetext(&mut self, tags: Self::Tags) -> ControlFlow<Self::Output, Self::Movetext> {
        let start_fen = tags
            .iter()
            .find(|(name, _)| name == "FEN")
            .map(|(_, value)| value.clone());

        let tree = match start_fen {
            Some(fen) => match GameTree::from_fen(&fen) {
                Ok(tree) => tree,
                Err(e) => return ControlFlow::Break(Err(e)),
            },
            None => GameTree::default(),
        };

        let mut tree = tree.into_origin(self.origin);
        for (name, value) in &tags {
            tree.set_tag(name, value);
        }

        ControlFlow::Continue(TreeState {
            tree,
            current: NodeId::ROOT,
            open_variations: Vec::new(),
        })
    }

    fn san(&mut self, state: &mut TreeState, san_plus: SanPlus) -> ControlFlow<Self::Output> {
        // Moves inherit their parent's origin; the root carries the tree's
        let origin = state.tree[state.current].origin;
        match state.tree.push_san(state.current, &san_plus.san, origin) {
            Ok(id) => {
                state.current = id;
                ControlFlow::Continue(())
            }
            Err(e) => ControlFlow::Break(Err(e)),
        }
    }

    fn nag(&mut self, state: &mut TreeState, nag: Nag) -> ControlFlow<Self::Output> {
        if state.current != NodeId::ROOT {
            state.tree.node_mut(state.current).nags.push(nag.0);
        }
        ControlFlow::Continue(())
    }

    fn comment(&mut self, state: &mut TreeState, comment: RawComment<'_>) -> ControlFlow<Self::Output> {
        let raw = String::from_utf8_lossy(comment.as_bytes());
        let is_candidate = comment_command(&raw, "origin") == Some("candidate");
        let text = ORIGIN_RE.replace_all(&raw, " ").trim().to_string();

        // Comments before the first move land on the root as the game comment
        let node = state.tree.node_mut(state.current);
        if is_candidate && state.current != NodeId::ROOT {
            node.origin = NodeOrigin::Candidate;
        }
        if text.is_empty() {
            return ControlFlow::Continue(());
        }
        node.comment = match node.comment.take() {
            Some(existing) => Some(format!("{existing} {text}")),
            None => Some(text),
        };
        ControlFlow::Continue(())
    }

    fn begin_variation(&mut self, state: &mut TreeState) -> ControlFlow<Self::Output, Skip> {
        // A variation replaces the move just played, so it hangs off its parent
        match state.tree.parent(state.current) {
            Some(parent) => {
                state.open_variations.push(state.current);
                state.current = parent;
                ControlFlow::Continue(Skip(false))
            }
            None => ControlFlow::Break(Err(TreeError::OrphanVariation)),
        }
    }

    fn end_variation(&mut self, state: &mut TreeState) -> ControlFlow<Self::Output> {
        if let Some(resume) = state.open_variations.pop() {
            state.current = resume;
        }
        ControlFlow::Continue(())
    }

    fn end_game(&mut self, state: TreeState) -> Self::Output {
        Ok(state.tree)
    }
}

/// Read every game in `pgn`. The outer error is a reader failure; each inner
/// result is one game, so a bad game does not hide the ones after it.
pub fn read_games(
    pgn: &str,
    origin: NodeOrigin,
) -> Result<Vec<Result<GameTree, TreeError>>, TreeError> {
    let mut reader = Reader::new(pgn.as_bytes());
    let mut builder = TreeBuilder { origin };
    let mut games = Vec::new();

    while let Some(game) = reader.read_game(&mut builder)? {
        games.push(game);
    }

    debug!(games = games.len(), "Read PGN games");
    Ok(games)
}

/// Parse every game in `pgn`, failing on the first malformed one.
pub fn parse_games(pgn: &str) -> Result<Vec<GameTree>, TreeError> {
    read_games(pgn, NodeOrigin::Solution)?.into_iter().collect()
}

/// Parse the first game in `pgn`. Blank text yields an empty tree from the
/// standard starting position.
pub fn parse_tree(pgn: &str) -> Result<GameTree, TreeError> {
    parse_tree_as(pgn, NodeOrigin::Solution)
}

/// Like `parse_tree`, labelling every node with `origin`.
pub fn parse_tree_as(pgn: &str, origin: NodeOrigin) -> Result<GameTree, TreeError> {
    match read_games(pgn, origin)?.into_iter().next() {
        Some(game) => game,
        None => Ok(GameTree::default().into_origin(origin)),
    }
}

/// Value of a `[%name value]` command embedded in a comment.
pub fn comment_command<'a>(comment: &'a str, name: &str) -> Option<&'a str> {
    COMMAND_RE
        .captures_iter(comment)
        .find(|cap| &cap[1] == name)
        .and_then(|cap| cap.get(2))
        .map(|m| m.as_str().trim())
}

/// Render the tree as PGN: tags, then movetext with variations.
pub fn write_pgn(tree: &GameTree) -> String {
    let mut out = String::new();
    for (name, value) in tree.tags() {
        out.push_str(&format!("[{} \"{}\"]\n", name, value.replace('"', "\\\"")));
    }
    if !tree.tags().is_empty() {
        out.push('\n');
    }

    let mut movetext = Vec::new();
    if let Some(comment) = &tree.root().comment {
        movetext.push(format!("{{{comment}}}"));
    }
    write_line(tree, NodeId::ROOT, true, &mut movetext);
    movetext.push(tree.tag("Result").unwrap_or("*").to_string());

    out.push_str(&movetext.join(" "));
    out.push('\n');
    out
}

/// Write the continuation of `parent`: its mainline child, that child's
/// sibling variations in parentheses, then the rest of the line.
fn write_line(tree: &GameTree, parent: NodeId, force_number: bool, out: &mut Vec<String>) {
    let children = tree.children(parent);
    let Some((&main, alternates)) = children.split_first() else {
        return;
    };

    write_move(tree, main, force_number, out);

    for &alt in alternates {
        let mut variation = Vec::new();
        write_move(tree, alt, true, &mut variation);
        write_line(tree, alt, rendered_comment(tree, alt).is_some(), &mut variation);
        out.push(format!("({})", variation.join(" ")));
    }

    let interrupted = !alternates.is_empty() || rendered_comment(tree, main).is_some();
    write_line(tree, main, interrupted, out);
}

fn write_move(tree: &GameTree, id: NodeId, force_number: bool, out: &mut Vec<String>) {
    let node = &tree[id];
    let Some(parent) = node.parent() else {
        return;
    };
    let before = tree[parent].position();
    let number = before.fullmoves();

    let mut token = match before.turn() {
        Color::White => format!("{number}. "),
        Color::Black if force_number => format!("{number}... "),
        Color::Black => String::new(),
    };
    token.push_str(&node.san);
    if node.position().is_checkmate() {
        token.push('#');
    } else if node.position().is_check() {
        token.push('+');
    }
    out.push(token);

    for nag in &node.nags {
        out.push(format!("${nag}"));
    }
    if let Some(comment) = rendered_comment(tree, id) {
        out.push(format!("{{{comment}}}"));
    }
}

/// Comment text as written: the node's own comment, plus the candidate
/// marker where a candidate branch leaves solution moves.
fn rendered_comment(tree: &GameTree, id: NodeId) -> Option<String> {
    let node = &tree[id];
    let starts_branch = node.origin == NodeOrigin::Candidate
        && node
            .parent()
            .is_some_and(|parent| tree[parent].origin != NodeOrigin::Candidate);

    match (&node.comment, starts_branch) {
        (Some(comment), true) => Some(format!("{comment} {CANDIDATE_MARKER}")),
        (Some(comment), false) => Some(comment.clone()),
        (None, true) => Some(CANDIDATE_MARKER.to_string()),
        (None, false) => None,
    }
}
