use crate::card::Card;
use std::cmp::Ordering;

/// Fixed action-play heuristic: engines before payload
pub struct DecisionEngine;

impl DecisionEngine {
    /// Choose which action card to play next. Returns its index in `hand`.
    pub fn choose_action_to_play(hand: &[&Card]) -> Option<usize> {
        hand.iter()
            .enumerate()
            .filter(|(_, card)| card.is_action())
            .fold(None, |best: Option<(usize, &Card)>, (idx, card)| match best {
                Some((_, current)) if Self::compare_actions(card, current) != Ordering::Greater => best,
                _ => Some((idx, *card)),
            })
            .map(|(idx, _)| idx)
    }

    /// Play priority of two action cards; `Greater` means `a` is played first.
    ///
    /// More +Actions, then more draw, more +Buys, more +Coins, merchant over
    /// non-merchant, and finally the lexicographically greater id.
    pub fn compare_actions(a: &Card, b: &Card) -> Ordering {
        a.actions
            .cmp(&b.actions)
            .then_with(|| a.draw.cmp(&b.draw))
            .then_with(|| a.buys.cmp(&b.buys))
            .then_with(|| a.coins.cmp(&b.coins))
            .then_with(|| a.merchant.cmp(&b.merchant))
            .then_with(|| a.id.cmp(&b.id))
    }
}
