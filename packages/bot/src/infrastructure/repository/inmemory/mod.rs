mod registry;

pub use registry::InMemoryRoomRepository;
