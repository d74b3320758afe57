//! Shared application state.

use std::sync::Arc;

use crate::{
    infrastructure::gateway::WebSocketGateway,
    usecase::{DispatchControlUseCase, InputCollector, ListRoomsUseCase, ManageLifecycleUseCase},
};

pub struct AppState {
    /// Gateway（ブリッジ接続の受け付けとコマンド結果の突き合わせ）
    pub gateway: Arc<WebSocketGateway>,
    /// ManageLifecycleUseCase（ルームのライフサイクル管理）
    pub lifecycle_usecase: Arc<ManageLifecycleUseCase>,
    /// DispatchControlUseCase（ボタン操作の振り分け）
    pub dispatch_usecase: Arc<DispatchControlUseCase>,
    /// InputCollector（追加入力の待機）
    pub collector: Arc<InputCollector>,
    /// ListRoomsUseCase（ルーム一覧取得）
    pub list_rooms_usecase: Arc<ListRoomsUseCase>,
}
