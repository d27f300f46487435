//! Legal-action enumeration.
//!
//! Pure functions over board and player state. The order of the returned
//! actions is fixed (intersections, then paths, then resources, then seats)
//! so an index chosen by a decision-maker always names the same action for
//! the same state.

use crate::actions::Action;
use crate::board::{Board, Resource, Seat};
use crate::player::Player;

/// Cards a seat may hold when a 7 is rolled without having to discard
pub const DISCARD_LIMIT: u32 = 7;

/// Cards given to the bank per card received
pub const BANK_TRADE_RATE: u32 = 4;

/// Every legal action for `seat`.
///
/// With `must_discard` set only the discard-phase set is returned. Outside
/// the discard phase `EndTurn` is always last, so the list is never empty.
pub fn legal_actions(
    board: &Board,
    players: &[Player],
    seat: Seat,
    must_discard: bool,
) -> Vec<Action> {
    let Some(player) = players.get(seat as usize) else {
        return vec![Action::EndTurn];
    };

    if must_discard {
        return discard_actions(player);
    }

    let mut actions = build_actions(board, player);
    actions.extend(gift_actions(player, players.len()));
    actions.extend(bank_trade_actions(player));
    actions.push(Action::EndTurn);
    actions
}

/// Settlements, then roads, then cities the player can afford
pub fn build_actions(board: &Board, player: &Player) -> Vec<Action> {
    let mut actions = Vec::new();

    if player.can_afford_settlement() {
        for at in board.valid_settlement_spots(player.seat) {
            actions.push(Action::BuildSettlement { at });
        }
    }

    if player.can_afford_road() {
        for path in board.valid_road_spots(player.seat) {
            actions.push(Action::BuildRoad { path });
        }
    }

    if player.can_afford_city() {
        for at in board.valid_city_spots(player.seat) {
            actions.push(Action::BuildCity { at });
        }
    }

    actions
}

/// One-unit gifts of every held resource to every other seat
pub fn gift_actions(player: &Player, seat_count: usize) -> Vec<Action> {
    let mut actions = Vec::new();
    for resource in Resource::ALL {
        if player.resources.get(resource) == 0 {
            continue;
        }
        for to in 0..seat_count as Seat {
            if to != player.seat {
                actions.push(Action::GiftTrade { to, resource });
            }
        }
    }
    actions
}

/// 4:1 bank trades for every resource held at least four times
pub fn bank_trade_actions(player: &Player) -> Vec<Action> {
    let mut actions = Vec::new();
    for give in Resource::ALL {
        if player.resources.get(give) < BANK_TRADE_RATE {
            continue;
        }
        for receive in Resource::ALL {
            if receive != give {
                actions.push(Action::BankTrade { give, receive });
            }
        }
    }
    actions
}

/// Cards a seat must discard: half its hand, rounded down
pub fn required_discard(player: &Player) -> u32 {
    player.total_cards() / 2
}

/// Discard-phase actions for a queued seat.
///
/// A single-resource discard of the full requirement is offered for every
/// resource that covers it. Failing that, the most-held resource is offered
/// as a best-effort discard. `EndTurn` stands in when nothing is owed.
pub fn discard_actions(player: &Player) -> Vec<Action> {
    let count = required_discard(player);
    if count == 0 {
        return vec![Action::EndTurn];
    }

    let mut actions: Vec<Action> = Resource::ALL
        .into_iter()
        .filter(|&r| player.resources.get(r) >= count)
        .map(|resource| Action::Discard { resource, count })
        .collect();

    if actions.is_empty() {
        let (resource, held) = player.resources.most_held();
        if held > 0 {
            actions.push(Action::Discard {
                resource,
                count: count.min(held),
            });
        }
    }

    if actions.is_empty() {
        actions.push(Action::EndTurn);
    }

    actions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionKind;
    use crate::board::Path;
    use crate::player::ResourceHand;
    use pretty_assertions::assert_eq;

    fn seats(hands: [ResourceHand; 4]) -> Vec<Player> {
        hands
            .into_iter()
            .enumerate()
            .map(|(i, hand)| Player::with_resources(i as Seat, hand))
            .collect()
    }

    #[test]
    fn test_broke_seat_can_only_end_turn() {
        let board = Board::standard();
        let players = seats(Default::default());
        assert_eq!(legal_actions(&board, &players, 0, false), vec![Action::EndTurn]);
    }

    #[test]
    fn test_action_order_is_stable() {
        let mut board = Board::standard();
        board.place_settlement(2, 0).unwrap();
        let mut players = seats(Default::default());
        players[0].resources = ResourceHand::uniform(4);

        let actions = legal_actions(&board, &players, 0, false);
        let kinds: Vec<ActionKind> = actions.iter().map(Action::kind).collect();

        let first_road = kinds.iter().position(|k| *k == ActionKind::BuildRoad).unwrap();
        let first_city = kinds.iter().position(|k| *k == ActionKind::BuildCity).unwrap();
        let first_gift = kinds.iter().position(|k| *k == ActionKind::GiftTrade).unwrap();
        let first_bank = kinds.iter().position(|k| *k == ActionKind::BankTrade).unwrap();
        assert!(first_road < first_city && first_city < first_gift && first_gift < first_bank);
        assert_eq!(actions[0], Action::BuildSettlement { at: 0 });
        assert_eq!(actions[first_road], Action::BuildRoad { path: Path::after(0) });
        assert_eq!(actions.last(), Some(&Action::EndTurn));

        // 11 settlements, 11 roads, 1 city, 5 * 3 gifts, 5 * 4 bank trades, end turn
        assert_eq!(actions.len(), 11 + 11 + 1 + 15 + 20 + 1);
        assert_eq!(actions, legal_actions(&board, &players, 0, false));
    }

    #[test]
    fn test_gift_actions_skip_self_and_empty_resources() {
        let player = Player::with_resources(1, ResourceHand::single(Resource::Grain, 1));
        assert_eq!(
            gift_actions(&player, 3),
            vec![
                Action::GiftTrade { to: 0, resource: Resource::Grain },
                Action::GiftTrade { to: 2, resource: Resource::Grain },
            ]
        );
    }

    #[test]
    fn test_bank_trades_need_four() {
        let player = Player::with_resources(0, ResourceHand::with_amounts(3, 0, 0, 0, 4));
        let trades = bank_trade_actions(&player);
        assert_eq!(trades.len(), 4);
        assert!(trades.iter().all(|a| matches!(
            a,
            Action::BankTrade { give: Resource::Ore, receive } if *receive != Resource::Ore
        )));
    }

    #[test]
    fn test_trades_follow_resource_order() {
        let player = Player::with_resources(0, ResourceHand::with_amounts(4, 4, 0, 0, 0));

        let gifts = gift_actions(&player, 2);
        assert_eq!(
            gifts,
            vec![
                Action::GiftTrade { to: 1, resource: Resource::Lumber },
                Action::GiftTrade { to: 1, resource: Resource::Brick },
            ]
        );

        let trades = bank_trade_actions(&player);
        let pairs: Vec<(Resource, Resource)> = trades
            .iter()
            .filter_map(|a| match a {
                Action::BankTrade { give, receive } => Some((*give, *receive)),
                _ => None,
            })
            .collect();
        assert_eq!(
            pairs,
            vec![
                (Resource::Lumber, Resource::Brick),
                (Resource::Lumber, Resource::Wool),
                (Resource::Lumber, Resource::Grain),
                (Resource::Lumber, Resource::Ore),
                (Resource::Brick, Resource::Lumber),
                (Resource::Brick, Resource::Wool),
                (Resource::Brick, Resource::Grain),
                (Resource::Brick, Resource::Ore),
            ]
        );
    }

    #[test]
    fn test_discard_phase_excludes_everything_else() {
        let board = Board::standard();
        let mut players = seats(Default::default());
        players[0].resources = ResourceHand::with_amounts(2, 2, 2, 2, 2);

        let actions = legal_actions(&board, &players, 0, true);
        assert!(actions
            .iter()
            .all(|a| matches!(a.kind(), ActionKind::Discard | ActionKind::EndTurn)));
    }

    #[test]
    fn test_discard_single_resource_options() {
        let player = Player::with_resources(0, ResourceHand::with_amounts(5, 0, 0, 5, 0));
        assert_eq!(
            discard_actions(&player),
            vec![
                Action::Discard { resource: Resource::Brick, count: 5 },
                Action::Discard { resource: Resource::Grain, count: 5 },
            ]
        );
    }

    #[test]
    fn test_discard_best_effort() {
        // 9 cards, 4 owed, nothing held four times
        let player = Player::with_resources(0, ResourceHand::with_amounts(2, 3, 2, 1, 1));
        assert_eq!(
            discard_actions(&player),
            vec![Action::Discard { resource: Resource::Lumber, count: 3 }]
        );
    }

    #[test]
    fn test_discard_tie_goes_to_lumber() {
        // 9 cards, 4 owed, brick and lumber tied at 3
        let player = Player::with_resources(0, ResourceHand::with_amounts(3, 3, 1, 1, 1));
        assert_eq!(
            discard_actions(&player),
            vec![Action::Discard { resource: Resource::Lumber, count: 3 }]
        );
    }

    #[test]
    fn test_discard_nothing_owed() {
        let player = Player::with_resources(0, ResourceHand::single(Resource::Ore, 1));
        assert_eq!(discard_actions(&player), vec![Action::EndTurn]);
    }
}
