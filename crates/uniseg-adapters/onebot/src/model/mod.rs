//! Data models for the OneBot v11 message format.

pub mod message;
pub mod segment;

pub use message::{CqCode, OneBotMessage, parse_cq_string};
pub use segment::{
    AtData, FaceData, ForwardData, ImageData, JsonData, NodeData, PokeData, RecordData,
    ReplyData, Segment, TextData, VideoData, XmlData,
};
