use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender, bounded, select};
use isoview_runtime::{ChatMessage, ClientCommand, MessageType, WorldMutation};
use isoview_world::{
    Direction, GameObject, MapSource, MobileState, ObjectKind, ProceduralMap, WorldGenConfig,
};

const PLAYER: u32 = 0x0000_0001;
const PLAYER_BODY: u16 = 0x0190;
const NPC_BODY: u16 = 0x0191;
const TORCH: u16 = 0x0A12;
const TORCH_LIGHT: u8 = 3;
const HELD_TORCH: u32 = 0x4000_0001;
const FIRST_NPC: u32 = 0x0000_0100;
const FIRST_ITEM: u32 = 0x4000_0100;
const NPCS: u32 = 6;
const TICK: Duration = Duration::from_millis(250);
/// NPCs take a step every this many ticks.
const WANDER_TICKS: u32 = 3;

#[derive(Clone, Copy, Debug)]
struct Actor {
    serial: u32,
    x: i32,
    y: i32,
    z: i8,
    body: u16,
    direction: Direction,
}

/// Stand-in for the network side: seeds a small world around the player,
/// answers client commands and keeps a few NPCs wandering.
pub struct WorldFeed {
    player: u32,
    stop: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl WorldFeed {
    pub fn start(
        cfg: WorldGenConfig,
        mutations: Sender<WorldMutation>,
        commands: Receiver<ClientCommand>,
    ) -> Self {
        let mut world = DemoWorld::new(ProceduralMap::new(cfg));
        // The initial world is queued before the first frame runs.
        for m in world.seed() {
            let _ = mutations.send(m);
        }
        let (stop, stop_rx) = bounded(1);
        let handle = std::thread::Builder::new()
            .name("world-feed".into())
            .spawn(move || world.run(&mutations, &commands, &stop_rx))
            .map_err(|e| log::error!("world feed thread: {}", e))
            .ok();
        Self {
            player: PLAYER,
            stop,
            handle,
        }
    }

    pub fn player_serial(&self) -> u32 {
        self.player
    }

    pub fn stop(mut self) {
        let _ = self.stop.try_send(());
        if let Some(h) = self.handle.take() {
            if h.join().is_err() {
                log::error!("world feed thread panicked");
            }
        }
    }
}

struct DemoWorld {
    map: ProceduralMap,
    player: Actor,
    npcs: Vec<Actor>,
    rng: u32,
    ticks: u32,
    next_item: u32,
}

impl DemoWorld {
    fn new(map: ProceduralMap) -> Self {
        let (w, h) = map.size();
        let (x, y) = dry_spot(&map, w / 2, h / 2);
        let z = ground(&map, x, y);
        let seed = map.config().seed as u32;
        Self {
            map,
            player: Actor {
                serial: PLAYER,
                x,
                y,
                z,
                body: PLAYER_BODY,
                direction: Direction::South,
            },
            npcs: Vec::new(),
            rng: seed | 1,
            ticks: 0,
            next_item: FIRST_ITEM,
        }
    }

    fn seed(&mut self) -> Vec<WorldMutation> {
        let mut out = vec![
            WorldMutation::EquipItem(GameObject::item(
                HELD_TORCH,
                self.player.x,
                self.player.y,
                self.player.z,
                TORCH,
                TORCH_LIGHT,
            )),
            WorldMutation::UpsertEntity(self.player_object()),
        ];
        for (dx, dy) in [(3, 0), (-3, 2), (0, -4), (5, 5)] {
            let (x, y) = (self.player.x + dx, self.player.y + dy);
            let serial = self.next_item;
            self.next_item += 1;
            out.push(WorldMutation::UpsertEntity(GameObject::item(
                serial,
                x,
                y,
                ground(&self.map, x, y),
                TORCH,
                TORCH_LIGHT,
            )));
        }
        for i in 0..NPCS {
            let dx = (self.next_rand() % 17) as i32 - 8;
            let dy = (self.next_rand() % 17) as i32 - 8;
            let (x, y) = dry_spot(&self.map, self.player.x + dx, self.player.y + dy);
            let npc = Actor {
                serial: FIRST_NPC + i,
                x,
                y,
                z: ground(&self.map, x, y),
                body: NPC_BODY,
                direction: Direction::from_index((i % 8) as u8),
            };
            self.npcs.push(npc);
            out.push(WorldMutation::UpsertEntity(mobile(&npc, i % 2 == 0, None)));
        }
        out.push(WorldMutation::Weather { intensity: 24 });
        out.push(system("Welcome to the demo world."));
        log::info!(
            "world feed seeded: player at ({}, {}, {}), {} npcs",
            self.player.x,
            self.player.y,
            self.player.z,
            self.npcs.len()
        );
        out
    }

    fn run(
        &mut self,
        mutations: &Sender<WorldMutation>,
        commands: &Receiver<ClientCommand>,
        stop: &Receiver<()>,
    ) {
        loop {
            let replies = select! {
                recv(stop) -> _ => break,
                recv(commands) -> cmd => match cmd {
                    Ok(cmd) => self.handle(cmd),
                    Err(_) => break,
                },
                default(TICK) => self.tick(),
            };
            for m in replies {
                if mutations.send(m).is_err() {
                    log::debug!("scene gone, world feed exiting");
                    return;
                }
            }
        }
        log::debug!("world feed stopped");
    }

    fn handle(&mut self, cmd: ClientCommand) -> Vec<WorldMutation> {
        match cmd {
            ClientCommand::Walk { direction, run } => {
                let (dx, dy) = direction.delta();
                let (x, y) = (self.player.x + dx, self.player.y + dy);
                self.player.direction = direction;
                if self.map.in_bounds(x, y) {
                    self.player.x = x;
                    self.player.y = y;
                    self.player.z = ground(&self.map, x, y);
                }
                let mut obj = self.player_object();
                if let Some(m) = obj.mobile_state_mut() {
                    m.is_running = run;
                }
                vec![WorldMutation::UpsertEntity(obj)]
            }
            ClientCommand::PathWalk { x, y, z, distance } => {
                log::debug!("path walk to ({}, {}, {}) within {}", x, y, z, distance);
                Vec::new()
            }
            ClientCommand::StopAutoWalk => Vec::new(),
            ClientCommand::PickUp { serial } => {
                log::info!("picked up {:#x}", serial);
                vec![
                    WorldMutation::RemoveEntity(serial),
                    system("You put the item in your pack."),
                ]
            }
            ClientCommand::DoubleClick { serial } => {
                if self.npcs.iter().any(|n| n.serial == serial) {
                    vec![WorldMutation::Chat(ChatMessage {
                        kind: MessageType::Regular,
                        name: "Villager".into(),
                        text: "Well met, traveler.".into(),
                        hue: 0x0035,
                        parent: Some(serial),
                    })]
                } else {
                    log::debug!("double click on {:#x}", serial);
                    Vec::new()
                }
            }
            ClientCommand::Ping => Vec::new(),
            ClientCommand::SystemMessage { text } => {
                log::info!("client notice: {}", text);
                Vec::new()
            }
        }
    }

    fn tick(&mut self) -> Vec<WorldMutation> {
        self.ticks = self.ticks.wrapping_add(1);
        if self.ticks % WANDER_TICKS != 0 {
            return Vec::new();
        }
        let mut out = Vec::new();
        for i in 0..self.npcs.len() {
            let r = self.next_rand();
            if r % 3 != 0 {
                continue;
            }
            let dir = Direction::from_index((r >> 8) as u8 % 8);
            let npc = &mut self.npcs[i];
            let (dx, dy) = dir.delta();
            let (x, y) = (npc.x + dx, npc.y + dy);
            npc.direction = dir;
            if self.map.in_bounds(x, y) && !is_water(&self.map, x, y) {
                npc.x = x;
                npc.y = y;
                npc.z = ground(&self.map, x, y);
            }
            let npc = *npc;
            out.push(WorldMutation::UpsertEntity(mobile(&npc, i % 2 == 0, None)));
        }
        out
    }

    fn player_object(&self) -> GameObject {
        mobile(&self.player, false, Some(HELD_TORCH))
    }

    // xorshift32
    fn next_rand(&mut self) -> u32 {
        let mut x = self.rng;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.rng = x;
        x
    }
}

fn mobile(a: &Actor, self_lit: bool, held_light: Option<u32>) -> GameObject {
    let mut obj = GameObject::mobile(a.serial, a.x, a.y, a.z, a.body);
    obj.kind = ObjectKind::Mobile(MobileState {
        direction: a.direction,
        held_light,
        self_lit,
        ..MobileState::default()
    });
    obj
}

fn system(text: &str) -> WorldMutation {
    WorldMutation::Chat(ChatMessage {
        kind: MessageType::System,
        name: String::new(),
        text: text.to_string(),
        hue: 0,
        parent: None,
    })
}

fn ground(map: &ProceduralMap, x: i32, y: i32) -> i8 {
    map.land(x, y).map_or(0, |l| l.z)
}

fn is_water(map: &ProceduralMap, x: i32, y: i32) -> bool {
    map.land(x, y)
        .is_some_and(|l| l.graphic == map.config().water.graphic)
}

/// Nearest dry tile to `(x, y)`, searching outward ring by ring.
fn dry_spot(map: &ProceduralMap, x: i32, y: i32) -> (i32, i32) {
    for r in 0i32..64 {
        for dy in -r..=r {
            for dx in -r..=r {
                if dx.abs() != r && dy.abs() != r {
                    continue;
                }
                let (tx, ty) = (x + dx, y + dy);
                if map.in_bounds(tx, ty) && !is_water(map, tx, ty) {
                    return (tx, ty);
                }
            }
        }
    }
    (x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> DemoWorld {
        DemoWorld::new(ProceduralMap::new(WorldGenConfig::default()))
    }

    #[test]
    fn seed_spawns_player_with_a_held_torch() {
        let mut w = world();
        let seeded = w.seed();
        let player = seeded.iter().find_map(|m| match m {
            WorldMutation::UpsertEntity(o) if o.serial == Some(PLAYER) => Some(o.clone()),
            _ => None,
        });
        let player = player.expect("player spawned");
        assert_eq!(player.mobile_state().unwrap().held_light, Some(HELD_TORCH));
        assert!(seeded
            .iter()
            .any(|m| matches!(m, WorldMutation::EquipItem(o) if o.serial == Some(HELD_TORCH))));
        assert_eq!(w.npcs.len(), NPCS as usize);
    }

    #[test]
    fn walk_moves_the_player_one_tile() {
        let mut w = world();
        let (x, y) = (w.player.x, w.player.y);
        let out = w.handle(ClientCommand::Walk {
            direction: Direction::East,
            run: true,
        });
        let (dx, dy) = Direction::East.delta();
        match &out[..] {
            [WorldMutation::UpsertEntity(o)] => {
                assert_eq!((o.x, o.y), (x + dx, y + dy));
                assert!(o.mobile_state().unwrap().is_running);
            }
            other => panic!("unexpected replies {other:?}"),
        }
    }

    #[test]
    fn pick_up_removes_the_item() {
        let mut w = world();
        let out = w.handle(ClientCommand::PickUp { serial: 0x4000_0100 });
        assert_eq!(out[0], WorldMutation::RemoveEntity(0x4000_0100));
    }

    #[test]
    fn pings_get_no_reply() {
        let mut w = world();
        assert!(w.handle(ClientCommand::Ping).is_empty());
    }
}
