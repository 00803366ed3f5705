use crate::messages::GameSnapshot;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub const BOARD_SIZE: usize = 9;
pub const LINE_LENGTH: usize = 3;

#[derive(Error, Debug, PartialEq)]
pub enum StateError {
    #[error("Player {0} is reported as winner but the game is not over")]
    WinnerWithoutGameOver(Mark),
    #[error("Player {0} is reported as winner of a drawn game")]
    WinnerOfDraw(Mark),
    #[error("Draw reported but the game is not over")]
    DrawWithoutGameOver,
    #[error("Game is over with neither a winner nor a draw")]
    UnresolvedOutcome,
    #[error("Winning line present without a winner")]
    LineWithoutWinner,
    #[error("Winner {0} present without a winning line")]
    WinnerWithoutLine(Mark),
    #[error("Winning line of length {0} exceeds the maximum of {}", LINE_LENGTH)]
    LineTooLong(usize),
    #[error("Board index {0} exceeds the board size of {}", BOARD_SIZE)]
    IndexOutOfBounds(usize),
}

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Mark {
    X,
    O,
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mark::X => write!(f, "X"),
            Mark::O => write!(f, "O"),
        }
    }
}

pub type Cell = Option<Mark>;

// Fixed-size so that a frame carrying any other number of cells fails to decode
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
pub struct Board([Cell; BOARD_SIZE]);

impl Default for Board {
    fn default() -> Self {
        Board([None; BOARD_SIZE])
    }
}

impl Board {
    pub fn new(cells: [Cell; BOARD_SIZE]) -> Self {
        Board(cells)
    }

    pub fn cells(&self) -> &[Cell; BOARD_SIZE] {
        &self.0
    }

    pub fn get(&self, position: Position) -> Cell {
        self.0[position.index()]
    }
}

#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(try_from = "usize", into = "usize")]
pub struct Position(usize);

impl Position {
    pub fn new(index: usize) -> Result<Self, StateError> {
        if index >= BOARD_SIZE {
            return Err(StateError::IndexOutOfBounds(index));
        }
        Ok(Position(index))
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl TryFrom<usize> for Position {
    type Error = StateError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Position::new(index)
    }
}

impl From<Position> for usize {
    fn from(position: Position) -> Self {
        position.0
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct WinningLine(Vec<Position>);

impl WinningLine {
    pub fn contains(&self, position: Position) -> bool {
        self.0.contains(&position)
    }

    pub fn positions(&self) -> &[Position] {
        &self.0
    }
}

impl TryFrom<Vec<usize>> for WinningLine {
    type Error = StateError;

    fn try_from(indices: Vec<usize>) -> Result<Self, Self::Error> {
        if indices.len() > LINE_LENGTH {
            return Err(StateError::LineTooLong(indices.len()));
        }
        let positions = indices
            .into_iter()
            .map(Position::new)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(WinningLine(positions))
    }
}

impl From<WinningLine> for Vec<usize> {
    fn from(line: WinningLine) -> Self {
        line.0.into_iter().map(usize::from).collect()
    }
}

/// The single value the view layer renders. Only ever replaced as a whole.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct GameState {
    board: Board,
    current_player: Mark,
    game_over: bool,
    winner: Option<Mark>,
    winning_line: Option<WinningLine>,
    is_draw: bool,
}

impl Default for GameState {
    fn default() -> Self {
        GameState {
            board: Board::default(),
            current_player: Mark::X,
            game_over: false,
            winner: None,
            winning_line: None,
            is_draw: false,
        }
    }
}

impl GameState {
    // Enforce the following constraints:
    // - a winner implies the game is over and is not a draw
    // - a draw implies the game is over and has no winner
    // - a finished game is either won or drawn
    // - a winning line is present exactly when a winner is
    pub fn new(
        board: Board,
        current_player: Mark,
        game_over: bool,
        winner: Option<Mark>,
        winning_line: Option<WinningLine>,
        is_draw: bool,
    ) -> Result<Self, StateError> {
        if let Some(mark) = winner {
            if !game_over {
                return Err(StateError::WinnerWithoutGameOver(mark));
            }
            if is_draw {
                return Err(StateError::WinnerOfDraw(mark));
            }
        }
        if is_draw && !game_over {
            return Err(StateError::DrawWithoutGameOver);
        }
        if game_over && winner.is_none() && !is_draw {
            return Err(StateError::UnresolvedOutcome);
        }
        match (winner, &winning_line) {
            (None, Some(_)) => return Err(StateError::LineWithoutWinner),
            (Some(mark), None) => return Err(StateError::WinnerWithoutLine(mark)),
            _ => {}
        }
        Ok(GameState {
            board,
            current_player,
            game_over,
            winner,
            winning_line,
            is_draw,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_player(&self) -> Mark {
        self.current_player
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn winner(&self) -> Option<Mark> {
        self.winner
    }

    pub fn winning_line(&self) -> Option<&WinningLine> {
        self.winning_line.as_ref()
    }

    pub fn is_draw(&self) -> bool {
        self.is_draw
    }
}

impl TryFrom<GameSnapshot> for GameState {
    type Error = StateError;

    fn try_from(snapshot: GameSnapshot) -> Result<Self, Self::Error> {
        GameState::new(
            snapshot.board,
            snapshot.current_player,
            snapshot.game_over,
            snapshot.winner,
            snapshot.winning_line,
            snapshot.is_draw,
        )
    }
}
