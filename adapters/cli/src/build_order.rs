use std::{error::Error, fmt, str::FromStr};

use waypoint_defence_core::{TurretKind, Vec2};

/// Separates the turret kind from the requested position.
const KIND_DELIMITER: char = '@';
/// Separates the two coordinates of the requested position.
const COORDINATE_DELIMITER: char = ',';

/// Turret purchase and placement requested on the command line as `kind@x,y`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct BuildOrder {
    /// Kind of turret to buy.
    pub(crate) kind: TurretKind,
    /// Position the turret should snap from.
    pub(crate) position: Vec2,
}

impl FromStr for BuildOrder {
    type Err = BuildOrderError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(BuildOrderError::Empty);
        }

        let (kind, position) = trimmed
            .split_once(KIND_DELIMITER)
            .ok_or(BuildOrderError::MissingPosition)?;
        let kind = parse_kind(kind.trim())?;
        let position = parse_position(position)?;
        Ok(Self { kind, position })
    }
}

/// Errors that can occur while parsing a build order.
#[derive(Debug, PartialEq)]
pub(crate) enum BuildOrderError {
    /// The provided string was empty or contained only whitespace.
    Empty,
    /// The `@x,y` suffix was missing.
    MissingPosition,
    /// The turret kind is not one of the known kinds.
    UnknownKind(String),
    /// The coordinates could not be parsed.
    InvalidPosition(String),
}

impl fmt::Display for BuildOrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "build order was empty"),
            Self::MissingPosition => write!(f, "build order must look like kind@x,y"),
            Self::UnknownKind(kind) => {
                let known: Vec<&str> = TurretKind::ALL.iter().map(|kind| kind.label()).collect();
                write!(
                    f,
                    "turret kind '{kind}' is not one of {}",
                    known.join(", ")
                )
            }
            Self::InvalidPosition(position) => {
                write!(f, "could not parse position '{position}'")
            }
        }
    }
}

impl Error for BuildOrderError {}

fn parse_kind(label: &str) -> Result<TurretKind, BuildOrderError> {
    TurretKind::ALL
        .into_iter()
        .find(|kind| kind.label().eq_ignore_ascii_case(label))
        .ok_or_else(|| BuildOrderError::UnknownKind(label.to_owned()))
}

fn parse_position(position: &str) -> Result<Vec2, BuildOrderError> {
    let invalid = || BuildOrderError::InvalidPosition(position.to_owned());
    let (x, y) = position.split_once(COORDINATE_DELIMITER).ok_or_else(invalid)?;
    let x = x.trim().parse::<f32>().map_err(|_| invalid())?;
    let y = y.trim().parse::<f32>().map_err(|_| invalid())?;
    if !x.is_finite() || !y.is_finite() {
        return Err(invalid());
    }
    Ok(Vec2::new(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_kind_and_position() {
        let order: BuildOrder = "cannon@-7,0.5".parse().expect("valid order");
        assert_eq!(
            order,
            BuildOrder {
                kind: TurretKind::Cannon,
                position: Vec2::new(-7.0, 0.5),
            }
        );

        let order: BuildOrder = " Frost @ 1.5 , 2 ".parse().expect("whitespace is tolerated");
        assert_eq!(order.kind, TurretKind::Frost);
        assert_eq!(order.position, Vec2::new(1.5, 2.0));
    }

    #[test]
    fn rejects_malformed_orders() {
        assert_eq!("".parse::<BuildOrder>(), Err(BuildOrderError::Empty));
        assert_eq!(
            "sniper".parse::<BuildOrder>(),
            Err(BuildOrderError::MissingPosition)
        );
        assert_eq!(
            "laser@1,2".parse::<BuildOrder>(),
            Err(BuildOrderError::UnknownKind("laser".to_owned()))
        );
        assert_eq!(
            "cannon@1;2".parse::<BuildOrder>(),
            Err(BuildOrderError::InvalidPosition("1;2".to_owned()))
        );
        assert_eq!(
            "cannon@inf,2".parse::<BuildOrder>(),
            Err(BuildOrderError::InvalidPosition("inf,2".to_owned()))
        );
    }

    #[test]
    fn unknown_kind_message_lists_known_kinds() {
        let message = BuildOrderError::UnknownKind("laser".to_owned()).to_string();
        assert_eq!(
            message,
            "turret kind 'laser' is not one of cannon, frost, sniper"
        );
    }
}
