//! UI language and localized strings.
//!
//! Every user-visible string is a `Text` key; state holds keys (errors included) and the
//! view localizes at render time, so toggling the language re-localizes everything on screen.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Zh,
}

impl Language {
    pub fn toggle(self) -> Self {
        match self {
            Language::En => Language::Zh,
            Language::Zh => Language::En,
        }
    }
}

/// Localizable UI text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Text {
    // Shell
    Brand,
    NavResidents,
    NavGroups,
    NavModels,
    NavHome,
    NavLearn,
    NavSettings,
    SignOut,
    SwitchLanguage,

    // Pages
    WelcomeTitle,
    WelcomeBody,
    LearnTitle,
    LearnBody,
    SettingsTitle,
    SettingsBody,
    LoginTitle,
    AccessToken,
    SignIn,
    ApiBaseUrl,
    ConfigFile,
    MatrixHomeserver,
    MatrixUser,
    MatrixRoom,
    ChatNavigationCommands,
    Logs,
    NoLogs,

    // List container
    InvalidPage,
    SelectItem,
    ModelDetailsPlaceholder,
    RegisterResident,
    RegisterNewResident,
    RunAgents,
    StopAgents,
    Username,
    Password,
    Cancel,
    Register,
    Members,
    Parameters,
    GroupLabel,
    AiAgent,
    PreviousPage,
    NextPage,

    // Detail views
    Edit,
    SaveChanges,
    DisplayName,
    Email,
    AgentStatus,
    Role,
    Admin,
    Administrator,
    User,
    Enabled,
    Disabled,
    EnabledState,
    DisabledState,
    Status,
    Active,
    Inactive,
    LastLogin,
    Never,
    NotSet,
    ResidentProfile,
    GroupProfile,
    ResidentProfilePlaceholder,
    GroupProfilePlaceholder,
    SaveProfile,
    Fullscreen,
    ExitFullscreen,
    GroupName,
    GroupId,
    Alias,
    Visibility,
    Public,
    Private,
    Encryption,
    Encrypted,
    NotEncrypted,
    Avatar,
    AvatarUrl,
    NoAvatar,

    // Chat
    NoMessages,
    TypeMessage,
    Send,
    FilePath,
    UploadFile,
    SendVoice,
    Connecting,
    ChatUnavailable,
    RetryScheduled,

    // Errors
    LoadResidentsFailed,
    LoadGroupsFailed,
    LoadModelsFailed,
    RegisterFailed,
    RunAgentsFailed,
    StopAgentsFailed,
    UpdateResidentFailed,
    UpdateGroupFailed,
    LoadProfileFailed,
    SaveProfileFailed,
    ChatConnectFailed,
    SendMessageFailed,
    UploadFileFailed,
    SendVoiceFailed,
}

impl Text {
    /// Localized string for this key.
    pub fn tr(self, language: Language) -> &'static str {
        let (en, zh) = self.pair();
        match language {
            Language::En => en,
            Language::Zh => zh,
        }
    }

    fn pair(self) -> (&'static str, &'static str) {
        use Text::*;
        match self {
            Brand => ("Bihua", "笔画"),
            NavResidents => ("Residents", "居民"),
            NavGroups => ("Groups", "群组"),
            NavModels => ("LLM Models", "LLM 模型"),
            NavHome => ("Home", "首页"),
            NavLearn => ("Learn", "学习"),
            NavSettings => ("Settings", "设置"),
            SignOut => ("Sign out", "退出登录"),
            SwitchLanguage => ("Switch to 中文", "Switch to English"),

            WelcomeTitle => ("Welcome to Bihua", "欢迎使用笔画"),
            WelcomeBody => (
                "Start your journey of learning Chinese characters today.",
                "今天就开始学习汉字吧。",
            ),
            LearnTitle => ("Learning Center", "学习中心"),
            LearnBody => (
                "Your learning content will appear here.",
                "您的学习内容将显示在这里。",
            ),
            SettingsTitle => ("Settings", "设置"),
            SettingsBody => ("Customize your learning experience.", "自定义您的学习体验。"),
            LoginTitle => ("Sign in to Bihua", "登录笔画"),
            AccessToken => ("Access token", "访问令牌"),
            SignIn => ("Sign in", "登录"),
            ApiBaseUrl => ("API base URL", "API 地址"),
            ConfigFile => ("Config file", "配置文件"),
            MatrixHomeserver => ("Matrix homeserver", "Matrix 服务器"),
            MatrixUser => ("Matrix user", "Matrix 用户"),
            MatrixRoom => ("Matrix room", "Matrix 房间"),
            ChatNavigationCommands => ("Chat navigation commands", "聊天导航命令"),
            Logs => ("Logs", "日志"),
            NoLogs => ("No log output yet.", "暂无日志。"),

            InvalidPage => ("Invalid page", "无效页面"),
            SelectItem => ("Select an item to view details", "选择一个项目查看详情"),
            ModelDetailsPlaceholder => (
                "Detailed information will be displayed here.",
                "详细信息将显示在这里。",
            ),
            RegisterResident => ("Register Resident", "注册居民"),
            RegisterNewResident => ("Register New Resident", "注册新居民"),
            RunAgents => ("Run Agents", "启动代理"),
            StopAgents => ("Stop Agents", "停止代理"),
            Username => ("Username", "用户名"),
            Password => ("Password", "密码"),
            Cancel => ("Cancel", "取消"),
            Register => ("Register", "注册"),
            Members => ("members", "成员"),
            Parameters => ("parameters", "参数"),
            GroupLabel => ("Group", "组"),
            AiAgent => ("AI Agent", "AI 代理"),
            PreviousPage => ("Previous page", "上一页"),
            NextPage => ("Next page", "下一页"),

            Edit => ("Edit", "编辑"),
            SaveChanges => ("Save Changes", "保存更改"),
            DisplayName => ("Display Name", "显示名称"),
            Email => ("Email", "邮箱"),
            AgentStatus => ("Agent Status", "代理状态"),
            Role => ("Role", "角色"),
            Admin => ("Admin", "管理员"),
            Administrator => ("Administrator", "管理员"),
            User => ("User", "用户"),
            Enabled => ("Enabled", "启用"),
            Disabled => ("Disabled", "禁用"),
            EnabledState => ("Enabled", "已启用"),
            DisabledState => ("Disabled", "已禁用"),
            Status => ("Status", "状态"),
            Active => ("Active", "活跃"),
            Inactive => ("Inactive", "不活跃"),
            LastLogin => ("Last Login", "最后登录"),
            Never => ("Never", "从未"),
            NotSet => ("Not set", "未设置"),
            ResidentProfile => ("Resident Profile", "居民简介"),
            GroupProfile => ("Group Profile", "群组简介"),
            ResidentProfilePlaceholder => (
                "Enter resident profile information...",
                "输入居民简介信息...",
            ),
            GroupProfilePlaceholder => ("Enter group profile information...", "输入群组简介信息..."),
            SaveProfile => ("Save Profile", "保存简介"),
            Fullscreen => ("Fullscreen", "全屏"),
            ExitFullscreen => ("Exit fullscreen", "退出全屏"),
            GroupName => ("Group Name", "群组名称"),
            GroupId => ("Group ID", "群组ID"),
            Alias => ("Alias", "别名"),
            Visibility => ("Visibility", "可见性"),
            Public => ("Public", "公开"),
            Private => ("Private", "私密"),
            Encryption => ("Encryption", "加密"),
            Encrypted => ("Encrypted", "加密"),
            NotEncrypted => ("Disabled", "未启用"),
            Avatar => ("Avatar", "头像"),
            AvatarUrl => ("Avatar URL", "头像链接"),
            NoAvatar => ("No avatar", "无头像"),

            NoMessages => ("No messages yet", "暂无消息"),
            TypeMessage => ("Type a message...", "输入消息..."),
            Send => ("Send", "发送"),
            FilePath => ("File path", "文件路径"),
            UploadFile => ("Upload file", "上传文件"),
            SendVoice => ("Send voice note", "发送语音"),
            Connecting => ("Connecting to chat server...", "正在连接聊天服务器..."),
            ChatUnavailable => (
                "Chat is not configured (homeserver, user, room and password are required).",
                "聊天未配置（需要服务器、用户、房间和密码）。",
            ),
            RetryScheduled => ("Rate limited, retrying shortly", "请求受限，稍后重试"),

            LoadResidentsFailed => ("Failed to load residents", "加载居民失败"),
            LoadGroupsFailed => ("Failed to load groups", "加载群组失败"),
            LoadModelsFailed => ("Failed to load LLM models", "加载 LLM 模型失败"),
            RegisterFailed => ("Failed to register resident", "注册居民失败"),
            RunAgentsFailed => ("Failed to run agents", "启动代理失败"),
            StopAgentsFailed => ("Failed to stop agents", "停止代理失败"),
            UpdateResidentFailed => ("Failed to update resident", "更新居民信息失败"),
            UpdateGroupFailed => ("Failed to update group", "更新群组失败"),
            LoadProfileFailed => ("Failed to load profile", "加载简介失败"),
            SaveProfileFailed => ("Failed to save profile", "保存简介失败"),
            ChatConnectFailed => ("Failed to connect to chat server", "无法连接到聊天服务器"),
            SendMessageFailed => ("Failed to send message", "发送消息失败"),
            UploadFileFailed => ("Failed to upload file", "上传文件失败"),
            SendVoiceFailed => ("Failed to send voice message", "发送语音消息失败"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips_between_languages() {
        assert_eq!(Language::En.toggle(), Language::Zh);
        assert_eq!(Language::Zh.toggle(), Language::En);
    }

    #[test]
    fn errors_are_localized() {
        assert_eq!(Text::RegisterFailed.tr(Language::En), "Failed to register resident");
        assert_eq!(Text::RegisterFailed.tr(Language::Zh), "注册居民失败");
        assert_eq!(Text::LoadProfileFailed.tr(Language::Zh), "加载简介失败");
    }

    #[test]
    fn settings_labels_follow_language() {
        assert_eq!(Text::MatrixRoom.tr(Language::En), "Matrix room");
        assert_eq!(Text::MatrixRoom.tr(Language::Zh), "Matrix 房间");
        assert_eq!(Text::ConfigFile.tr(Language::Zh), "配置文件");
        assert_ne!(
            Text::ChatNavigationCommands.tr(Language::En),
            Text::ChatNavigationCommands.tr(Language::Zh)
        );
    }

    #[test]
    fn language_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Language::Zh).unwrap(), "\"zh\"");
        let parsed: Language = serde_json::from_str("\"en\"").unwrap();
        assert_eq!(parsed, Language::En);
    }
}
