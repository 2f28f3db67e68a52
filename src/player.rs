/// The player body: gravity, jumping, walking and tile interactions.
///
/// Collision is point sampling at the corners of an 8×8 box against the
/// tile grid; there is no sweep.  Movement is whole pixels per tick.

use tracing::info;

use crate::entities::{Facing, InputSnapshot, TILE_SIZE};
use crate::room::RoomState;
use crate::tilemap::Tilemap;
use crate::tiles::{classify, is_collider, TileCode, TileKind};

/// Ticks of upward motion per jump.
pub const JUMP_TICKS: u32 = 12;
pub const FALL_SPEED: i32 = 2;
pub const RISE_SPEED: i32 = 2;
pub const WALK_SPEED: i32 = 1;

/// Offset of the far edge of the player box from its origin.
const FAR: i32 = TILE_SIZE - 1;

fn cell(px: i32) -> i32 {
    px.div_euclid(TILE_SIZE)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Alive,
    /// Touched fire or asked to restart; already moved to the checkpoint.
    Died,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Player {
    pub x: i32,
    pub y: i32,
    /// Remaining ticks of the current jump; 0 when grounded or falling.
    pub jump_ticks: u32,
    pub facing: Facing,
    /// Walk cycle parity, flipped on every successful step.
    pub walk_frame: bool,
    pub won: bool,
    jump_held: bool,
}

impl Player {
    pub fn new(spawn: (i32, i32)) -> Self {
        Self {
            x: spawn.0,
            y: spawn.1,
            jump_ticks: 0,
            facing: Facing::Right,
            walk_frame: false,
            won: false,
            jump_held: false,
        }
    }

    pub fn is_jumping(&self) -> bool {
        self.jump_ticks > 0
    }

    /// Tile codes under the four corners: top-left, bottom-left, top-right,
    /// bottom-right.
    pub fn corners(&self, map: &impl Tilemap) -> [TileCode; 4] {
        [
            map.tile_at(cell(self.x), cell(self.y)),
            map.tile_at(cell(self.x), cell(self.y + FAR)),
            map.tile_at(cell(self.x + FAR), cell(self.y)),
            map.tile_at(cell(self.x + FAR), cell(self.y + FAR)),
        ]
    }

    /// One frame: move, die if needed, then interact with whatever the
    /// corners touched.  A death still dispatches the corners sampled before
    /// the respawn; the caller rolls the room back afterwards.
    pub fn update(
        &mut self,
        map: &impl Tilemap,
        input: InputSnapshot,
        checkpoint: (i32, i32),
        room: &mut RoomState,
    ) -> StepOutcome {
        self.update_vertical(map, input.jump);
        self.update_horizontal(map, input);

        let corners = self.corners(map);
        let on_fire = corners
            .iter()
            .any(|&code| classify(code) == Some(TileKind::Fire));
        let outcome = if input.restart || on_fire {
            info!(x = self.x, y = self.y, restart = input.restart, "player died");
            self.respawn(checkpoint);
            StepOutcome::Died
        } else {
            StepOutcome::Alive
        };

        for code in corners {
            match classify(code) {
                Some(TileKind::Key(color)) => room.collect_key(color),
                Some(TileKind::Button(color)) => room.press_button(color, self.x, self.y),
                Some(TileKind::ShipPart) => self.won = true,
                _ => {}
            }
        }
        outcome
    }

    fn update_vertical(&mut self, map: &impl Tilemap, jump: bool) {
        let newly_pressed = jump && !self.jump_held;
        self.jump_held = jump;

        let below = cell(self.y) + 1;
        let grounded = is_collider(map.tile_at(cell(self.x), below))
            || is_collider(map.tile_at(cell(self.x + FAR), below));
        if !grounded {
            if self.jump_ticks == 0 {
                self.y += FALL_SPEED;
            }
        } else if newly_pressed {
            self.jump_ticks = JUMP_TICKS;
        }

        let above = cell(self.y - 1);
        if is_collider(map.tile_at(cell(self.x), above))
            || is_collider(map.tile_at(cell(self.x + FAR), above))
        {
            self.jump_ticks = 0;
        }

        if self.jump_ticks > 0 {
            self.jump_ticks -= 1;
            self.y -= RISE_SPEED;
        }
    }

    fn update_horizontal(&mut self, map: &impl Tilemap, input: InputSnapshot) {
        let top = cell(self.y);
        let bottom = cell(self.y + FAR);
        let free = |col: i32| {
            !is_collider(map.tile_at(col, top)) && !is_collider(map.tile_at(col, bottom))
        };

        if input.right && free(cell(self.x) + 1) {
            self.x += WALK_SPEED;
            self.facing = Facing::Right;
            self.walk_frame = !self.walk_frame;
        } else if input.left && self.x > 0 && free(cell(self.x - 1)) {
            self.x -= WALK_SPEED;
            self.facing = Facing::Left;
            self.walk_frame = !self.walk_frame;
        } else {
            self.walk_frame = false;
        }
    }

    fn respawn(&mut self, checkpoint: (i32, i32)) {
        self.x = checkpoint.0;
        self.y = checkpoint.1;
        self.jump_ticks = 0;
        self.facing = Facing::Right;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_floors_negative_pixels() {
        assert_eq!(cell(-1), -1);
        assert_eq!(cell(0), 0);
        assert_eq!(cell(7), 0);
        assert_eq!(cell(8), 1);
    }
}
