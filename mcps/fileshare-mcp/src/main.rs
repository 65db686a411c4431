//! File Share MCP - read-only, sandboxed access to one directory tree

use fileshare_mcp::FileShareMcpServer;

mcp_common::serve_stdio!(FileShareMcpServer, "fileshare_mcp");
